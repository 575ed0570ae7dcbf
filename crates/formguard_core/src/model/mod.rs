//! Validation-facing view of form controls.
//!
//! # Responsibility
//! - Turn raw elements into typed `Field` snapshots.
//! - Keep attribute probing in one place so validation matches on kinds.
//!
//! # Invariants
//! - Classification never mutates the document.

pub mod field;
