//! Form guard behavior.
//!
//! # Responsibility
//! - Validate a form's required fields and file inputs before submission.
//! - Attach and clear per-field error annotations.
//! - Hide modal targets when a dismiss trigger is clicked.
//!
//! # Invariants
//! - Validation visits every field; it never short-circuits.
//! - At most one annotation exists per field after any guard call.
//! - A dismiss click mutates at most one element, and only its inline style.
//!
//! # See also
//! - `page` for the event wiring that drives these operations.

use crate::config::{ConfigError, GuardConfig};
use crate::dom::Selector;

mod annotation;
mod dismiss;
mod validate;

pub use annotation::Annotation;
pub use dismiss::DismissOutcome;

/// Configured guard. Cheap to clone; holds no document state.
#[derive(Debug, Clone)]
pub struct FormGuard {
    config: GuardConfig,
    dismiss_selector: Selector,
}

impl FormGuard {
    /// Builds a guard after validating `config`.
    pub fn new(config: GuardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dismiss_selector = Selector::parse(&config.dismiss_selector)
            .map_err(|_| ConfigError::InvalidDismissSelector(config.dismiss_selector.clone()))?;
        Ok(Self {
            config,
            dismiss_selector,
        })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn dismiss_selector(&self) -> &Selector {
        &self.dismiss_selector
    }
}

impl Default for FormGuard {
    fn default() -> Self {
        let config = GuardConfig::default();
        let dismiss_selector = Selector::parse(&config.dismiss_selector)
            .expect("valid default dismiss selector");
        Self {
            config,
            dismiss_selector,
        }
    }
}
