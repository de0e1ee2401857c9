//! Thin wrapper over a tree-sitter parser bound to one grammar.

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Parser, Tree};

pub struct SourceParser {
    inner: Parser,
}

impl SourceParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut inner = Parser::new();
        inner
            .set_language(language)
            .map_err(|err| anyhow!("load grammar: {err}"))?;
        Ok(Self { inner })
    }

    /// Parse `text` into a concrete syntax tree.
    ///
    /// Trees containing syntax errors are returned as-is; check
    /// `tree.root_node().has_error()` when that matters.
    pub fn parse(&mut self, text: &str) -> Result<Tree> {
        self.inner
            .parse(text, None)
            .context("parser produced no tree")
    }
}
