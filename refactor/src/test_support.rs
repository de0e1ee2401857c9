//! Test-only helpers for parsing C# snippets and staging source files.

use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::lang::csharp;
use crate::uast::{FunctionDef, TopLevel};

/// Parse C# into a tree-sitter tree, panicking on setup failure.
pub fn parse_csharp(code: &str) -> Tree {
    csharp::parser()
        .expect("csharp parser")
        .parse(code)
        .expect("parse tree")
}

/// Depth-first search for the first node of `kind`, including `node` itself.
pub fn find_node<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|child| find_node(child, kind))
}

/// Lower C# source into a UAST, panicking if parsing fails.
pub fn parse_unit_ok(source: &str) -> TopLevel {
    csharp::parse_unit(source).expect("lower compilation unit")
}

/// First function found in declaration order.
pub fn first_function(unit: &TopLevel) -> Option<&FunctionDef> {
    match unit {
        TopLevel::Function(function) => Some(function),
        TopLevel::Module(module) => module.body.iter().find_map(first_function),
        TopLevel::Class(class) => class.body.iter().find_map(first_function),
        TopLevel::Statement(_) | TopLevel::Unknown(_) => None,
    }
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_temp_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp source");
    path
}

/// Repository fixture directory (`fixtures/csharp/inputs`).
pub fn fixture_inputs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join("csharp")
        .join("inputs")
}

/// Read a fixture input by file name.
pub fn read_fixture(name: &str) -> String {
    let path = fixture_inputs_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}
