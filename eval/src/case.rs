//! Case file parsing and validation.
//!
//! Cases are TOML files naming an input fixture, the expected output fixture
//! and the refactoring steps that turn one into the other.
//! See `fixtures/cases/` for examples.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use refactor::core::identifier::{validate_declaration_keyword, validate_identifier};

/// A parsed case file: fixtures plus the steps to apply.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CaseFile {
    pub case: CaseMeta,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CaseMeta {
    /// Unique identifier (slug format: `[a-z0-9_-]+`).
    pub id: String,
    /// Input fixture, relative to `fixtures/`.
    pub input: PathBuf,
    /// Expected output fixture, relative to `fixtures/`.
    pub expected: PathBuf,
}

/// One refactoring applied to the output of the previous step.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    RenameVariable {
        old_name: String,
        new_name: String,
    },
    ExtractVariable {
        /// Exact source text of the expression to extract.
        expression: String,
        new_name: String,
        /// 1-based extractable occurrence.
        #[serde(default = "default_occurrence")]
        occurrence: usize,
        /// Declaration keyword; `var` when omitted.
        #[serde(default)]
        keyword: Option<String>,
    },
}

fn default_occurrence() -> usize {
    1
}

impl CaseFile {
    /// Load and validate a case file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read case {}", path.display()))?;
        let case: CaseFile =
            toml::from_str(&contents).with_context(|| format!("parse case {}", path.display()))?;
        case.validate()
            .with_context(|| format!("validate case {}", path.display()))?;
        Ok(case)
    }

    #[cfg(test)]
    pub fn parse_str(contents: &str) -> Result<Self> {
        let case: CaseFile = toml::from_str(contents).context("parse case")?;
        case.validate()?;
        Ok(case)
    }

    fn validate(&self) -> Result<()> {
        validate_case_id(&self.case.id)?;
        validate_fixture_path("case.input", &self.case.input)?;
        validate_fixture_path("case.expected", &self.case.expected)?;
        if self.steps.is_empty() {
            bail!("steps must be a non-empty array");
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.validate()
                .with_context(|| format!("steps[{}] invalid", index))?;
        }
        Ok(())
    }
}

impl Step {
    fn validate(&self) -> Result<()> {
        match self {
            Step::RenameVariable { old_name, new_name } => {
                validate_identifier(old_name).context("rename_variable.old_name")?;
                validate_identifier(new_name).context("rename_variable.new_name")?;
            }
            Step::ExtractVariable {
                expression,
                new_name,
                occurrence,
                keyword,
            } => {
                if expression.trim().is_empty() {
                    bail!("extract_variable.expression must be non-empty");
                }
                validate_identifier(new_name).context("extract_variable.new_name")?;
                if *occurrence == 0 {
                    bail!("extract_variable.occurrence must be > 0");
                }
                if let Some(keyword) = keyword {
                    validate_declaration_keyword(keyword).context("extract_variable.keyword")?;
                }
            }
        }
        Ok(())
    }
}

/// Discover and load all case files from a directory.
///
/// Returns cases sorted by id. Errors if duplicate ids are found.
pub fn discover_cases(dir: &Path) -> Result<Vec<(PathBuf, CaseFile)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut cases = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read cases dir {}", dir.display()))? {
        let entry = entry.context("read case entry")?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let case = CaseFile::load(&path)?;
        cases.push((path, case));
    }
    cases.sort_by(|left, right| left.1.case.id.cmp(&right.1.case.id));
    for pair in cases.windows(2) {
        if pair[0].1.case.id == pair[1].1.case.id {
            return Err(anyhow!("duplicate case.id {}", pair[0].1.case.id));
        }
    }
    Ok(cases)
}

pub fn validate_case_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("case.id must be non-empty");
    }
    if id.contains('/') || id.contains('\\') {
        bail!("case.id must not contain path separators");
    }
    if id.contains("..") {
        bail!("case.id must not contain '..'");
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        bail!("case.id must use [a-z0-9_-] only");
    }
    Ok(())
}

fn validate_fixture_path(label: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("{label} must be non-empty");
    }
    if path
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
    {
        bail!("{label} must be a relative path inside fixtures/");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_case() {
        let input = r#"
[case]
id = "rename-paint"
input = "csharp/inputs/input1.cs"
expected = "csharp/inputs/var_rename.cs"

[[steps]]
type = "rename_variable"
old_name = "lengthString"
new_name = "lengthStr"

[[steps]]
type = "extract_variable"
expression = "a + b"
new_name = "sum"
"#;
        let case = CaseFile::parse_str(input).expect("case parses");
        assert_eq!(case.case.id, "rename-paint");
        assert_eq!(case.steps.len(), 2);
        assert_eq!(
            case.steps[1],
            Step::ExtractVariable {
                expression: "a + b".to_string(),
                new_name: "sum".to_string(),
                occurrence: 1,
                keyword: None,
            }
        );
    }

    #[test]
    fn rejects_invalid_id() {
        let input = r#"
[case]
id = "bad/id"
input = "a.cs"
expected = "b.cs"

[[steps]]
type = "rename_variable"
old_name = "a"
new_name = "b"
"#;
        let err = CaseFile::parse_str(input).expect_err("invalid id");
        assert!(err.to_string().contains("case.id"));
    }

    #[test]
    fn rejects_paths_escaping_fixtures() {
        let input = r#"
[case]
id = "escape"
input = "../secret.cs"
expected = "b.cs"

[[steps]]
type = "rename_variable"
old_name = "a"
new_name = "b"
"#;
        let err = CaseFile::parse_str(input).expect_err("escaping path");
        assert!(err.to_string().contains("case.input"));
    }

    #[test]
    fn rejects_missing_steps_and_bad_names() {
        let input = r#"
[case]
id = "empty"
input = "a.cs"
expected = "b.cs"
"#;
        let err = CaseFile::parse_str(input).expect_err("no steps");
        assert!(err.to_string().contains("steps"));

        let input = r#"
[case]
id = "keyword"
input = "a.cs"
expected = "b.cs"

[[steps]]
type = "rename_variable"
old_name = "a"
new_name = "class"
"#;
        let _err = CaseFile::parse_str(input).expect_err("keyword name");
    }

    #[test]
    fn rejects_extract_keyword_that_is_not_a_type() {
        let input = r#"
[case]
id = "bad-keyword"
input = "a.cs"
expected = "b.cs"

[[steps]]
type = "extract_variable"
expression = "a + b"
new_name = "sum"
keyword = "int y; //"
"#;
        let err = CaseFile::parse_str(input).expect_err("bad keyword");
        assert!(format!("{err:#}").contains("extract_variable.keyword"));
    }

    #[test]
    fn repository_cases_are_valid() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("fixtures")
            .join("cases");
        let cases = discover_cases(&dir).expect("discover");
        let ids: Vec<&str> = cases.iter().map(|(_, case)| case.case.id.as_str()).collect();
        assert_eq!(ids, vec!["extract-order-total", "rename-paint"]);
    }
}
