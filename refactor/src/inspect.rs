//! Read-only views of a source file: the lowered UAST and regenerated code.

use std::path::Path;

use anyhow::{Context, Result};

use crate::io::config::RefactorConfig;
use crate::io::source::read_source;
use crate::lang::csharp::{CSharpCodeGenerator, parse_unit};

/// Pretty-printed JSON of the lowered UAST.
pub fn dump_uast(path: &Path) -> Result<String> {
    let source = read_source(path)?;
    let unit = parse_unit(&source).with_context(|| format!("parse {}", path.display()))?;
    serde_json::to_string_pretty(&unit).context("serialize uast")
}

/// C# regenerated from the UAST with the configured indent.
pub fn generate(path: &Path, config: &RefactorConfig) -> Result<String> {
    let source = read_source(path)?;
    let unit = parse_unit(&source).with_context(|| format!("parse {}", path.display()))?;
    Ok(CSharpCodeGenerator::new(&config.indent).generate(&unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_temp_source;

    #[test]
    fn dump_contains_function_and_identifiers() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_temp_source(
            temp.path(),
            "T.cs",
            "class T { int Add(int a) { return a + 1; } }",
        );

        let json = dump_uast(&path).expect("dump");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");

        assert!(value.get("Module").is_some());
        assert!(json.contains("\"Add\""));
        assert!(json.contains("\"Binary\""));
    }

    #[test]
    fn generate_uses_configured_indent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_temp_source(
            temp.path(),
            "T.cs",
            "public class MyClass { public int MyMethod(int a) { return 5; } }",
        );
        let config = RefactorConfig {
            indent: "  ".to_string(),
            ..RefactorConfig::default()
        };

        let code = generate(&path, &config).expect("generate");

        assert_eq!(
            code,
            "public class MyClass {\n  public int MyMethod(int a) {\n    return 5;\n  }\n}"
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = dump_uast(&temp.path().join("absent.cs")).expect_err("missing");
        assert!(format!("{err:#}").contains("absent.cs"));
    }
}
