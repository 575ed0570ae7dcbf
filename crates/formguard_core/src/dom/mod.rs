//! Typed in-memory document model consumed by the form guard.
//!
//! # Responsibility
//! - Own every node of one page in an arena addressed by `NodeId`.
//! - Expose the attribute, class-list, value, file-list and inline-style
//!   operations the guard reads and mutates.
//! - Resolve the compound selectors used to locate forms, fields and modals.
//!
//! # Invariants
//! - A `NodeId` is only meaningful for the document that created it.
//! - Every attached node has exactly one parent; the root has none.
//! - Attribute names are stored lowercase.
//!
//! # See also
//! - `guard` for the behavior that runs on top of this model.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod document;
pub mod fixture;
pub mod selector;

pub use document::{Document, NodeId, SelectedFile};
pub use fixture::{FixtureError, NodeSpec};
pub use selector::Selector;

pub type DomResult<T> = Result<T, DomError>;

/// Document-level faults. None of these occur when callers only pass ids
/// obtained from the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    UnknownNode(NodeId),
    NotAnElement(NodeId),
    CannotHaveChildren(NodeId),
    HierarchyCycle { parent: NodeId, child: NodeId },
    NotAChild { parent: NodeId, child: NodeId },
    NotAForm(NodeId),
    InvalidSelector(String),
}

impl Display for DomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "node {id} does not belong to this document"),
            Self::NotAnElement(id) => write!(f, "node {id} is not an element"),
            Self::CannotHaveChildren(id) => write!(f, "node {id} cannot have children"),
            Self::HierarchyCycle { parent, child } => {
                write!(f, "appending {child} under {parent} would create a cycle")
            }
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a direct child of {parent}")
            }
            Self::NotAForm(id) => write!(f, "node {id} is not a form element"),
            Self::InvalidSelector(selector) => write!(f, "unsupported selector: `{selector}`"),
        }
    }
}

impl Error for DomError {}
