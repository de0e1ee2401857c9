//! C# identifier rules for names introduced by refactorings.

use std::sync::LazyLock;

use anyhow::{Result, bail};

static IDENTIFIER_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^@?[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Reserved C# keywords. Contextual keywords (`var`, `value`, `async`, ...)
/// are valid identifiers and are not listed.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_valid_identifier(name: &str) -> bool {
    validate_identifier(name).is_ok()
}

/// Validate a name that a refactoring is about to write into the source.
///
/// `@`-prefixed names (`@class`) may spell keywords.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("identifier must not be empty");
    }
    if !IDENTIFIER_RE.is_match(name) {
        bail!("'{name}' is not a valid C# identifier");
    }
    if is_keyword(name) {
        bail!("'{name}' is a reserved C# keyword (use '@{name}' to escape it)");
    }
    Ok(())
}

/// Built-in C# type keywords usable as a declaration type.
pub fn is_builtin_type(name: &str) -> bool {
    matches!(
        name,
        "bool" | "byte" | "char" | "decimal" | "double" | "float" | "int" | "long" | "object"
            | "sbyte" | "short" | "string" | "uint" | "ulong" | "ushort"
    )
}

/// Validate the keyword or type written in front of an extracted variable:
/// `var`, a built-in type keyword, or a plain type name.
pub fn validate_declaration_keyword(keyword: &str) -> Result<()> {
    if keyword == "var" || is_builtin_type(keyword) || is_valid_identifier(keyword) {
        return Ok(());
    }
    bail!("declaration keyword must be 'var', a type keyword or an identifier (got '{keyword}')")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_and_escaped_names() {
        for name in ["x", "_tmp", "lengthStr", "HEIGHT", "value2", "@class", "var"] {
            assert!(is_valid_identifier(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in ["", "2x", "a-b", "a b", "@", "x.y"] {
            assert!(!is_valid_identifier(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn rejects_keywords_with_hint() {
        let err = validate_identifier("return").expect_err("keyword");
        assert!(err.to_string().contains("@return"));
    }

    #[test]
    fn declaration_keywords() {
        for keyword in ["var", "int", "double", "string", "Order", "@event"] {
            assert!(validate_declaration_keyword(keyword).is_ok(), "{keyword} should be accepted");
        }
        for keyword in ["", "int y; //", "void", "List<int>", "class"] {
            let err = validate_declaration_keyword(keyword).expect_err("rejected");
            assert!(err.to_string().contains("declaration keyword"));
        }
    }
}
