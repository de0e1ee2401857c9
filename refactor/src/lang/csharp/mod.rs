//! C# front end backed by `tree-sitter-c-sharp`.

pub mod codegen;
pub mod lower;

use anyhow::Result;
use tracing::warn;

use crate::parser::SourceParser;
use crate::uast::TopLevel;

pub use codegen::CSharpCodeGenerator;
pub use lower::{lower_block, lower_compilation_unit, lower_expression, lower_statement, lower_top_level};

/// Parser bound to the C# grammar.
pub fn parser() -> Result<SourceParser> {
    SourceParser::new(tree_sitter_c_sharp::language())
}

/// Parse and lower a whole C# compilation unit.
///
/// Syntax errors are logged, not fatal: the erroneous regions lower to opaque
/// nodes and refactorings never edit inside them.
pub fn parse_unit(source: &str) -> Result<TopLevel> {
    let tree = parser()?.parse(source)?;
    let root = tree.root_node();
    if root.has_error() {
        warn!("source contains syntax errors; affected regions are left untouched");
    }
    Ok(lower_compilation_unit(root, source))
}
