//! Orchestration for `refactor rename-variable` and `refactor extract-variable`.
//!
//! The `*_source` functions work purely in memory and are what the eval
//! harness drives. `rename_variable` and `extract_variable` add file I/O on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::core::Refactoring;
use crate::core::edit::{TextEdit, apply_edits};
use crate::core::extract::{DEFAULT_KEYWORD, ExtractVariable};
use crate::core::identifier::{validate_declaration_keyword, validate_identifier};
use crate::core::rename::RenameVariable;
use crate::core::scope::{collect_scopes, enclosing_scope};
use crate::io::config::RefactorConfig;
use crate::io::source::{read_source, write_source};
use crate::lang::csharp::parse_unit;

/// Result of running one refactoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefactorOutcome {
    /// Edits were computed and applied to produce `source`.
    Applied { edits: Vec<TextEdit>, source: String },
    /// Nothing in the input matched.
    NoMatch,
}

impl RefactorOutcome {
    pub fn edit_count(&self) -> usize {
        match self {
            Self::Applied { edits, .. } => edits.len(),
            Self::NoMatch => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub path: PathBuf,
    pub old_name: String,
    pub new_name: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    pub path: PathBuf,
    /// Source text of the expression to extract.
    pub expression: String,
    pub new_name: String,
    /// 1-based index among the extractable occurrences of `expression`.
    pub occurrence: usize,
    pub dry_run: bool,
}

/// Rename `old_name` to `new_name` throughout `source`.
#[tracing::instrument(skip(source), fields(len = source.len()))]
pub fn rename_source(source: &str, old_name: &str, new_name: &str) -> Result<RefactorOutcome> {
    validate_identifier(old_name).context("invalid old name")?;
    validate_identifier(new_name).context("invalid new name")?;
    if old_name == new_name {
        bail!("new name is the same as the old name ('{old_name}')");
    }

    let unit = parse_unit(source)?;
    let rename = RenameVariable::new(old_name, new_name);
    let conflicts = rename.conflicts(&unit);
    if !conflicts.is_empty() {
        bail!("rename would change meaning:\n{}", conflicts.join("\n"));
    }

    let edits = rename.edits(&unit);
    if edits.is_empty() {
        debug!("no occurrences found");
        return Ok(RefactorOutcome::NoMatch);
    }
    let source = apply_edits(source, &edits)?;
    Ok(RefactorOutcome::Applied { edits, source })
}

/// Extract the `occurrence`-th extractable instance of `expression` into a
/// new variable declared with `keyword`.
#[tracing::instrument(skip(source), fields(len = source.len()))]
pub fn extract_source(
    source: &str,
    expression: &str,
    new_name: &str,
    occurrence: usize,
    keyword: &str,
) -> Result<RefactorOutcome> {
    validate_identifier(new_name).context("invalid new name")?;
    validate_declaration_keyword(keyword).context("invalid declaration keyword")?;
    let expression = expression.trim();
    if expression.is_empty() {
        bail!("expression must not be empty");
    }
    if occurrence == 0 {
        bail!("occurrence is 1-based (got 0)");
    }

    let unit = parse_unit(source)?;
    let mut remaining = occurrence;
    for (start, text) in source.match_indices(expression) {
        let extract = ExtractVariable::new(start, start + text.len(), new_name, source)
            .with_keyword(keyword);
        let edits = extract.edits(&unit);
        if edits.is_empty() {
            debug!(offset = start, "occurrence not extractable");
            continue;
        }
        remaining -= 1;
        if remaining > 0 {
            continue;
        }

        let scopes = collect_scopes(&unit);
        let selection = extract.selection().unwrap_or_default();
        if let Some(scope) = enclosing_scope(&scopes, selection) {
            if scope.declared.contains(new_name) {
                bail!("'{new_name}' is already declared in {}", scope.name);
            }
            if scope.referenced.contains(new_name) {
                bail!(
                    "'{new_name}' is already used in {}; a new local would shadow it",
                    scope.name
                );
            }
        }
        let source = apply_edits(source, &edits)?;
        return Ok(RefactorOutcome::Applied { edits, source });
    }

    debug!(found = occurrence - remaining, "requested occurrence not found");
    Ok(RefactorOutcome::NoMatch)
}

pub fn rename_variable(request: &RenameRequest, config: &RefactorConfig) -> Result<RefactorOutcome> {
    let source = read_source(&request.path)?;
    let outcome = rename_source(&source, &request.old_name, &request.new_name)
        .with_context(|| format!("rename in {}", request.path.display()))?;
    commit(&request.path, &outcome, request.dry_run, config)?;
    Ok(outcome)
}

pub fn extract_variable(
    request: &ExtractRequest,
    config: &RefactorConfig,
) -> Result<RefactorOutcome> {
    let source = read_source(&request.path)?;
    let keyword = if config.extract.keyword.is_empty() {
        DEFAULT_KEYWORD
    } else {
        config.extract.keyword.as_str()
    };
    let outcome = extract_source(
        &source,
        &request.expression,
        &request.new_name,
        request.occurrence,
        keyword,
    )
    .with_context(|| format!("extract in {}", request.path.display()))?;
    commit(&request.path, &outcome, request.dry_run, config)?;
    Ok(outcome)
}

fn commit(path: &Path, outcome: &RefactorOutcome, dry_run: bool, config: &RefactorConfig) -> Result<()> {
    let RefactorOutcome::Applied { edits, source } = outcome else {
        return Ok(());
    };
    if dry_run {
        debug!(path = %path.display(), "dry run; leaving file untouched");
        return Ok(());
    }
    write_source(path, source, config.backup)?;
    info!(path = %path.display(), edits = edits.len(), "wrote refactored source");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::io::source::backup_path;
    use crate::test_support::{read_fixture, write_temp_source};

    fn applied(outcome: RefactorOutcome) -> String {
        match outcome {
            RefactorOutcome::Applied { source, .. } => source,
            RefactorOutcome::NoMatch => panic!("expected edits"),
        }
    }

    #[test]
    fn paint_fixture_renames_to_expected() {
        let input = read_fixture("input1.cs");
        let expected = read_fixture("var_rename.cs");

        let step = applied(rename_source(&input, "lengthString", "lengthStr").expect("rename"));
        let out = applied(rename_source(&step, "height", "HEIGHT").expect("rename"));

        assert_eq!(out, expected);
    }

    #[test]
    fn order_fixture_extracts_to_expected() {
        let input = read_fixture("order_calculator.cs");
        let expected = read_fixture("var_extract.cs");

        let out = applied(
            extract_source(&input, "(price * quantity) - discount + shipping", "value", 1, "var")
                .expect("extract"),
        );

        assert_eq!(out, expected);
    }

    #[test]
    fn rename_rejects_keyword_and_same_name() {
        let source = "class T { void Run(int a) { Use(a); } }";
        let err = rename_source(source, "a", "class").expect_err("keyword");
        assert!(format!("{err:#}").contains("@class"));
        assert!(rename_source(source, "a", "a").is_err());
    }

    #[test]
    fn rename_refuses_conflicting_name() {
        let source = "class T { void Run(int a) { int b = 2; Use(a, b); } }";
        let err = rename_source(source, "a", "b").expect_err("conflict");
        assert!(err.to_string().contains("Run:"));
    }

    #[test]
    fn rename_without_occurrence_is_no_match() {
        let outcome = rename_source("class T { void Run() { } }", "x", "y").expect("rename");
        assert_eq!(outcome, RefactorOutcome::NoMatch);
    }

    #[test]
    fn extract_picks_requested_occurrence() {
        let source = "class T {\n    void Run() {\n        int x = a + b;\n        int y = a + b;\n    }\n}";
        let out = applied(extract_source(source, "a + b", "sum", 2, "var").expect("extract"));
        assert_eq!(
            out,
            "class T {\n    void Run() {\n        int x = a + b;\n        var sum = a + b;\n        int y = sum;\n    }\n}"
        );
    }

    #[test]
    fn extract_skips_comment_occurrence() {
        let source = "class T {\n    void Run() {\n        // a + b\n        Use(a + b);\n    }\n}";
        let out = applied(extract_source(source, "a + b", "sum", 1, "int").expect("extract"));
        assert_eq!(
            out,
            "class T {\n    void Run() {\n        // a + b\n        int sum = a + b;\n        Use(sum);\n    }\n}"
        );
    }

    #[test]
    fn extract_reports_no_match_past_last_occurrence() {
        let source = "class T { void Run() { int x = a + b; } }";
        let outcome = extract_source(source, "a + b", "sum", 2, "var").expect("extract");
        assert_eq!(outcome, RefactorOutcome::NoMatch);
        let outcome = extract_source(source, "c * d", "sum", 1, "var").expect("extract");
        assert_eq!(outcome, RefactorOutcome::NoMatch);
    }

    #[test]
    fn extract_refuses_name_already_declared() {
        let source = "class T { void Run() { int sum = 0; int x = a + b; } }";
        let err = extract_source(source, "a + b", "sum", 1, "var").expect_err("conflict");
        assert!(err.to_string().contains("already declared in Run"));
    }

    #[test]
    fn extract_refuses_name_referenced_in_scope() {
        let source = "class T { int total; void Run() { int x = a + b; Use(total); } }";
        let err = extract_source(source, "a + b", "total", 1, "var").expect_err("shadowing");
        assert!(err.to_string().contains("already used in Run"));
    }

    #[test]
    fn extract_rejects_keyword_that_is_not_a_type() {
        let source = "class T { void Run() { int x = a + b; } }";
        let err = extract_source(source, "a + b", "sum", 1, "int y; //").expect_err("keyword");
        assert!(format!("{err:#}").contains("declaration keyword"));
    }

    #[test]
    fn extract_rejects_zero_occurrence() {
        let source = "class T { void Run() { int x = a + b; } }";
        assert!(extract_source(source, "a + b", "sum", 0, "var").is_err());
    }

    #[test]
    fn rename_variable_writes_file_with_backup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let original = "class T { void Run(int a) { Use(a); } }";
        let path = write_temp_source(temp.path(), "T.cs", original);
        let config = RefactorConfig {
            backup: true,
            ..RefactorConfig::default()
        };
        let request = RenameRequest {
            path: path.clone(),
            old_name: "a".to_string(),
            new_name: "b".to_string(),
            dry_run: false,
        };

        let outcome = rename_variable(&request, &config).expect("rename");

        assert_eq!(outcome.edit_count(), 2);
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "class T { void Run(int b) { Use(b); } }"
        );
        assert_eq!(fs::read_to_string(backup_path(&path)).expect("backup"), original);
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        let original = "class T { void Run() { int x = 5 + 10; } }";
        let path = write_temp_source(temp.path(), "T.cs", original);
        let request = ExtractRequest {
            path: path.clone(),
            expression: "5 + 10".to_string(),
            new_name: "sum".to_string(),
            occurrence: 1,
            dry_run: true,
        };

        let outcome = extract_variable(&request, &RefactorConfig::default()).expect("extract");

        assert_eq!(outcome.edit_count(), 2);
        assert_eq!(fs::read_to_string(&path).expect("read"), original);
    }
}
