//! I/O helpers for refactor commands.

pub mod config;
pub mod source;
