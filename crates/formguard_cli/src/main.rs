//! Command-line runner for form guard fixtures.
//!
//! # Responsibility
//! - Load a JSON page fixture (and optional guard config) from disk.
//! - Run the page lifecycle: load, optional clicks, then validate or submit
//!   every form.
//! - Print a JSON report and exit non-zero when any form is invalid.

use clap::Parser;
use formguard_core::{
    default_log_level, init_logging, DismissOutcome, Document, DomResult, FormGuard, GuardConfig,
    LogTarget, NodeId, Page, SubmitResult,
};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "formguard", version, about = "Validate form fixtures the way the page would")]
struct Cli {
    /// Page fixture: JSON array of element trees.
    fixture: PathBuf,

    /// Guard config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dispatch submit events instead of calling validation directly.
    #[arg(long)]
    submit: bool,

    /// Click the first element matching this selector before validating.
    /// May be repeated.
    #[arg(long = "click", value_name = "SELECTOR")]
    clicks: Vec<String>,

    /// Log level; `debug` in debug builds and `info` otherwise.
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    forms: Vec<FormReport>,
    hidden: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FormReport {
    index: usize,
    id: Option<String>,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted: Option<bool>,
    annotations: Vec<AnnotationReport>,
}

#[derive(Debug, Serialize)]
struct AnnotationReport {
    field: String,
    message: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let target = match &cli.log_dir {
        Some(dir) => LogTarget::Directory(dir.clone()),
        None => LogTarget::Stderr,
    };
    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    if let Err(err) = init_logging(level, target) {
        eprintln!("formguard: {err}");
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(report) => {
            let all_valid = report.forms.iter().all(|form| form.valid);
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("formguard: {err}");
                    return ExitCode::from(2);
                }
            }
            if all_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(message) => {
            error!("event=cli_failed module=cli status=error message={message}");
            eprintln!("formguard: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<Report, String> {
    let config = match &cli.config {
        Some(path) => GuardConfig::from_path(path).map_err(|err| err.to_string())?,
        None => GuardConfig::default(),
    };
    let guard = FormGuard::new(config).map_err(|err| err.to_string())?;

    let raw = std::fs::read_to_string(&cli.fixture)
        .map_err(|err| format!("failed to read fixture `{}`: {err}", cli.fixture.display()))?;
    let doc = Document::from_fixture_json(&raw).map_err(|err| err.to_string())?;

    let mut page = Page::new(doc, guard);
    page.load().map_err(|err| err.to_string())?;

    let mut hidden = Vec::new();
    for selector in &cli.clicks {
        let target = page
            .document()
            .query_selector(selector)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("no element matches `{selector}`"))?;
        let outcome = page.click(target).map_err(|err| err.to_string())?;
        for dismissal in outcome.dismissals {
            if let DismissOutcome::Hidden(node) = dismissal {
                hidden.push(describe(page.document(), node));
            }
        }
    }

    let forms = page
        .document()
        .query_selector_all("form")
        .map_err(|err| err.to_string())?;
    let mut reports = Vec::with_capacity(forms.len());
    for (index, form) in forms.into_iter().enumerate() {
        reports.push(check_form(&mut page, index, form, cli.submit).map_err(|err| err.to_string())?);
    }

    Ok(Report {
        forms: reports,
        hidden,
    })
}

fn check_form(
    page: &mut Page,
    index: usize,
    form: NodeId,
    submit: bool,
) -> DomResult<FormReport> {
    let (valid, submitted) = if submit {
        let submitted = page.submit(form)? == SubmitResult::Submitted;
        (submitted, Some(submitted))
    } else {
        (page.validate_form(form)?, None)
    };

    let doc = page.document();
    let annotations = page
        .guard()
        .annotations(doc, form)?
        .into_iter()
        .map(|annotation| AnnotationReport {
            field: describe(doc, annotation.field),
            message: annotation.message,
        })
        .collect();

    Ok(FormReport {
        index,
        id: doc.attr(form, "id")?.map(str::to_string),
        valid,
        submitted,
        annotations,
    })
}

/// Human label for a node: its `name`, then `#id`, then tag and arena index.
fn describe(doc: &Document, node: NodeId) -> String {
    if let Ok(Some(name)) = doc.attr(node, "name") {
        return name.to_string();
    }
    if let Ok(Some(id)) = doc.attr(node, "id") {
        return format!("#{id}");
    }
    let tag = doc.tag_name(node).unwrap_or("node");
    format!("{tag}[{}]", node.index())
}
