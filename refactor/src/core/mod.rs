//! Deterministic, pure refactoring logic.
//!
//! Core modules must be free of I/O side effects. They operate on the UAST
//! and the source text held in memory and return edits suitable for tests.

pub mod edit;
pub mod extract;
pub mod identifier;
pub mod rename;
pub mod scope;
pub mod walk;

use crate::uast::TopLevel;
use edit::TextEdit;

pub use extract::ExtractVariable;
pub use rename::RenameVariable;

/// A source transformation expressed as text edits against the original.
///
/// An empty result means the refactoring does not apply to `unit`.
pub trait Refactoring {
    fn edits(&self, unit: &TopLevel) -> Vec<TextEdit>;
}
