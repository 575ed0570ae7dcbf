//! Submit-time form validation and modal dismissal over a typed document.
//! This crate is the single source of truth for validation behavior.

pub mod config;
pub mod dom;
pub mod guard;
pub mod logging;
pub mod model;
pub mod page;

pub use config::{ConfigError, ErrorMessages, GuardConfig};
pub use dom::{Document, DomError, DomResult, FixtureError, NodeId, NodeSpec, SelectedFile, Selector};
pub use guard::{Annotation, DismissOutcome, FormGuard};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::field::{file_extension, AcceptList, Field, FieldKind};
pub use page::{DispatchOutcome, Page, PageEvent, ReadyState, SubmitResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
