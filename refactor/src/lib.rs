//! Tree-sitter based refactoring for C# source files.
//!
//! Source text is parsed with tree-sitter and lowered into a language-neutral
//! syntax tree ([`uast`]). Refactorings inspect that tree and produce byte
//! range edits against the original text, so comments and formatting survive.
//!
//! - **[`core`]**: Pure, deterministic logic (name walks, scopes, edits,
//!   rename and extract). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config and source files).
//! - **[`lang`]**: Per-language lowering and code generation.
//!
//! Orchestration modules ([`session`], [`inspect`]) coordinate core logic with
//! I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod inspect;
pub mod io;
pub mod lang;
pub mod logging;
pub mod parser;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod uast;
