//! Field classification for validation.
//!
//! # Responsibility
//! - Map a form control element onto a closed set of field kinds.
//! - Parse `accept` filters and derive file extensions.
//!
//! # Invariants
//! - Only `input`, `select` and `textarea` elements are fields.
//! - An `input` is a file field iff its `type` is `file` (case-insensitive).
//! - An empty `accept` attribute means "no filter", same as an absent one.

use crate::dom::{Document, DomResult, NodeId, SelectedFile};

const FORM_CONTROL_TAGS: &[&str] = &["input", "select", "textarea"];

/// Kind-specific state of one field, captured at classification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Any control whose value is a plain string.
    TextLike { value: String },
    /// `input[type=file]` with its current selection and optional filter.
    File {
        files: Vec<SelectedFile>,
        accept: Option<AcceptList>,
    },
}

/// A form control snapshot used by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub node: NodeId,
    /// `required` attribute presence.
    pub required: bool,
    pub kind: FieldKind,
}

impl Field {
    /// Classifies `node`. Returns `Ok(None)` for elements that are not form
    /// controls; those are never validated.
    pub fn classify(doc: &Document, node: NodeId) -> DomResult<Option<Self>> {
        let tag = doc.tag_name(node)?;
        if !FORM_CONTROL_TAGS.contains(&tag) {
            return Ok(None);
        }

        let required = doc.has_attr(node, "required")?;
        let is_file = tag == "input"
            && doc
                .attr(node, "type")?
                .is_some_and(|kind| kind.eq_ignore_ascii_case("file"));

        let kind = if is_file {
            FieldKind::File {
                files: doc.files(node)?.to_vec(),
                accept: doc.attr(node, "accept")?.and_then(AcceptList::parse),
            }
        } else {
            FieldKind::TextLike {
                value: doc.value(node)?.to_string(),
            }
        };

        Ok(Some(Self {
            node,
            required,
            kind,
        }))
    }

    /// The string value a required check looks at. File fields expose the
    /// first selected file name.
    pub fn value(&self) -> &str {
        match &self.kind {
            FieldKind::TextLike { value } => value.as_str(),
            FieldKind::File { files, .. } => files.first().map(|file| file.name.as_str()).unwrap_or(""),
        }
    }

    /// Returns whether the trimmed value is empty.
    pub fn is_blank(&self) -> bool {
        self.value().trim().is_empty()
    }
}

/// Parsed `accept` attribute.
///
/// Entries are trimmed and lose one leading dot, so `.png, .JPG` becomes
/// `["png", "JPG"]`. Entries keep their case; MIME tokens such as `image/*`
/// are kept verbatim and never match an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList {
    entries: Vec<String>,
}

impl AcceptList {
    /// Returns `None` for an empty attribute value.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let entries = raw
            .split(',')
            .map(|entry| {
                let entry = entry.trim();
                entry.strip_prefix('.').unwrap_or(entry).to_string()
            })
            .collect();
        Some(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Exact membership test against an already lowercased extension.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.entries.iter().any(|entry| entry == extension)
    }

    /// Returns whether `file_name`'s extension is listed.
    pub fn accepts_file(&self, file_name: &str) -> bool {
        self.accepts_extension(&file_extension(file_name))
    }
}

/// Lowercased substring after the final `.`; the whole name when it has no
/// dot.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .unwrap_or(file_name)
        .to_lowercase()
}
