//! Stable exit codes for refactor CLI commands.

/// Command succeeded and any edits were applied (or printed for a dry run).
pub const OK: i32 = 0;
/// Invalid input, a refused refactoring, or an I/O or parse failure.
pub const INVALID: i32 = 1;
/// Nothing in the file matched the requested refactoring.
pub const NO_MATCH: i32 = 2;
