//! Guard configuration.
//!
//! # Responsibility
//! - Name the marker classes, message node tag and dismiss selector.
//! - Hold the three user-facing validation messages.
//!
//! # Invariants
//! - Defaults reproduce the stock page behavior (`is-invalid`,
//!   `invalid-feedback`, `[data-dismiss="modal"]`).
//! - A config must pass `validate()` before a guard is built from it.

use crate::dom::Selector;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_INVALID_CLASS: &str = "is-invalid";
pub const DEFAULT_FEEDBACK_CLASS: &str = "invalid-feedback";
pub const DEFAULT_FEEDBACK_TAG: &str = "div";
pub const DEFAULT_DISMISS_SELECTOR: &str = r#"[data-dismiss="modal"]"#;

/// Messages attached by the validation checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorMessages {
    /// Required field left blank.
    pub required: String,
    /// Required file input without a selection.
    pub file_missing: String,
    /// Selected file rejected by the `accept` filter.
    pub unsupported_format: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            required: "This field is required.".to_string(),
            file_missing: "Please select a file.".to_string(),
            unsupported_format: "Unsupported file format. Please select a valid file."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Class toggled on invalid fields.
    pub invalid_class: String,
    /// Class carried by inserted message nodes.
    pub feedback_class: String,
    /// Tag of inserted message nodes.
    pub feedback_tag: String,
    /// Selects the elements that close a modal on click.
    pub dismiss_selector: String,
    pub messages: ErrorMessages,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            invalid_class: DEFAULT_INVALID_CLASS.to_string(),
            feedback_class: DEFAULT_FEEDBACK_CLASS.to_string(),
            feedback_tag: DEFAULT_FEEDBACK_TAG.to_string(),
            dismiss_selector: DEFAULT_DISMISS_SELECTOR.to_string(),
            messages: ErrorMessages::default(),
        }
    }
}

impl GuardConfig {
    /// Parses a JSON config; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_class_name(&self.invalid_class, "invalid_class")?;
        require_class_name(&self.feedback_class, "feedback_class")?;

        let tag = self.feedback_tag.trim();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ConfigError::InvalidTag(self.feedback_tag.clone()));
        }

        Selector::parse(&self.dismiss_selector)
            .map_err(|_| ConfigError::InvalidDismissSelector(self.dismiss_selector.clone()))?;

        require_message(&self.messages.required, "required")?;
        require_message(&self.messages.file_missing, "file_missing")?;
        require_message(&self.messages.unsupported_format, "unsupported_format")?;
        Ok(())
    }
}

fn require_class_name(value: &str, name: &'static str) -> Result<(), ConfigError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidClassName {
            field: name,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn require_message(value: &str, name: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyMessage(name));
    }
    Ok(())
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, message: String },
    Json(serde_json::Error),
    InvalidClassName { field: &'static str, value: String },
    InvalidTag(String),
    InvalidDismissSelector(String),
    EmptyMessage(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "failed to read config `{path}`: {message}"),
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidClassName { field, value } => {
                write!(f, "{field} must be one non-empty class token, got `{value}`")
            }
            Self::InvalidTag(value) => write!(f, "feedback_tag is invalid: `{value}`"),
            Self::InvalidDismissSelector(value) => {
                write!(f, "dismiss_selector is not supported: `{value}`")
            }
            Self::EmptyMessage(name) => write!(f, "message `{name}` must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
