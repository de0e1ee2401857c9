//! Case execution orchestration.
//!
//! Reads the fixtures, runs each step in memory through the refactor library,
//! classifies the result and captures it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, instrument};

use refactor::core::extract::DEFAULT_KEYWORD;
use refactor::session::{RefactorOutcome, extract_source, rename_source};

use crate::case::{CaseFile, Step};
use crate::outcome::{Outcome, StepsOutput, classify_outcome};
use crate::results::{CaptureInput, capture_results};

/// Result of running a single case.
#[derive(Debug)]
pub struct RunOutcome {
    /// Unique identifier for this eval run.
    pub eval_run_id: String,
    /// Path to the results directory.
    pub results_dir: PathBuf,
    /// Classified outcome.
    pub outcome: Outcome,
}

/// Run a case end-to-end: read fixtures, apply steps, classify, capture.
///
/// Fixture paths in the case are resolved against `fixtures_dir`. Fixtures
/// are only read.
#[instrument(skip_all, fields(case_id = %case.case.id))]
pub fn run_case(
    fixtures_dir: &Path,
    results_base: &Path,
    case_path: &Path,
    case: &CaseFile,
) -> Result<RunOutcome> {
    info!("case run started");
    let started_at = Utc::now();
    let eval_run_id = format!("eval-{}", started_at.format("%Y%m%d_%H%M%S_%3f"));

    let mut errors = Vec::new();
    let output = match load_fixtures(fixtures_dir, case) {
        Ok((input, expected)) => match apply_steps(&input, &case.steps) {
            Ok(output) => Some((output, expected)),
            Err(err) => {
                errors.push(format!("{err:#}"));
                None
            }
        },
        Err(err) => {
            errors.push(format!("{err:#}"));
            None
        }
    };
    let finished_at = Utc::now();

    let (outcome, actual) = match &output {
        Some((steps, expected)) => {
            let actual = match steps {
                StepsOutput::Completed(text) => Some(text.as_str()),
                StepsOutput::NoMatch { step } => {
                    errors.push(format!("steps[{step}] found nothing to refactor"));
                    None
                }
            };
            (classify_outcome(Some(steps), expected), actual)
        }
        None => (classify_outcome(None, ""), None),
    };

    let capture_input = CaptureInput {
        case_id: &case.case.id,
        case_path,
        eval_run_id: &eval_run_id,
        started_at,
        finished_at,
        outcome,
        actual,
        errors,
    };
    let results_dir = capture_results(results_base, &capture_input).context("capture results")?;

    info!(outcome = ?outcome, results_dir = %results_dir.display(), "case run complete");

    Ok(RunOutcome {
        eval_run_id,
        results_dir,
        outcome,
    })
}

fn load_fixtures(fixtures_dir: &Path, case: &CaseFile) -> Result<(String, String)> {
    let input_path = fixtures_dir.join(&case.case.input);
    let expected_path = fixtures_dir.join(&case.case.expected);
    let input = fs::read_to_string(&input_path)
        .with_context(|| format!("read input fixture {}", input_path.display()))?;
    let expected = fs::read_to_string(&expected_path)
        .with_context(|| format!("read expected fixture {}", expected_path.display()))?;
    Ok((input, expected))
}

/// Apply `steps` in order, each to the previous step's output.
pub fn apply_steps(input: &str, steps: &[Step]) -> Result<StepsOutput> {
    let mut current = input.to_string();
    for (index, step) in steps.iter().enumerate() {
        let outcome = match step {
            Step::RenameVariable { old_name, new_name } => {
                rename_source(&current, old_name, new_name)
            }
            Step::ExtractVariable {
                expression,
                new_name,
                occurrence,
                keyword,
            } => extract_source(
                &current,
                expression,
                new_name,
                *occurrence,
                keyword.as_deref().unwrap_or(DEFAULT_KEYWORD),
            ),
        }
        .with_context(|| format!("steps[{index}]"))?;

        match outcome {
            RefactorOutcome::Applied { edits, source } => {
                debug!(step = index, edits = edits.len(), "step applied");
                current = source;
            }
            RefactorOutcome::NoMatch => return Ok(StepsOutput::NoMatch { step: index }),
        }
    }
    Ok(StepsOutput::Completed(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::discover_cases;
    use crate::results::ACTUAL_FILE;
    use tempfile::tempdir;

    fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
    }

    #[test]
    fn repository_cases_pass() {
        let temp = tempdir().expect("tempdir");
        let fixtures = fixtures_dir();
        let cases = discover_cases(&fixtures.join("cases")).expect("discover");
        assert!(!cases.is_empty());

        for (path, case) in &cases {
            let run = run_case(&fixtures, temp.path(), path, case).expect("run case");
            assert_eq!(run.outcome, Outcome::Pass, "case {}", case.case.id);
            assert!(run.results_dir.join(ACTUAL_FILE).exists());
            assert!(run.eval_run_id.starts_with("eval-"));
        }
    }

    #[test]
    fn steps_chain_through_previous_output() {
        let steps = vec![
            Step::RenameVariable {
                old_name: "a".to_string(),
                new_name: "b".to_string(),
            },
            Step::RenameVariable {
                old_name: "b".to_string(),
                new_name: "c".to_string(),
            },
        ];
        let output = apply_steps("class T { void Run(int a) { Use(a); } }", &steps).expect("apply");
        assert_eq!(
            output,
            StepsOutput::Completed("class T { void Run(int c) { Use(c); } }".to_string())
        );
    }

    #[test]
    fn reports_step_without_match() {
        let steps = vec![Step::ExtractVariable {
            expression: "x * y".to_string(),
            new_name: "product".to_string(),
            occurrence: 1,
            keyword: None,
        }];
        let output = apply_steps("class T { void Run() { int z = 1; } }", &steps).expect("apply");
        assert_eq!(output, StepsOutput::NoMatch { step: 0 });
    }

    #[test]
    fn missing_fixture_is_error_outcome() {
        let temp = tempdir().expect("tempdir");
        let case_path = temp.path().join("missing.toml");
        fs::write(&case_path, "").expect("case");
        let case = CaseFile {
            case: crate::case::CaseMeta {
                id: "missing".to_string(),
                input: PathBuf::from("absent.cs"),
                expected: PathBuf::from("absent.cs"),
            },
            steps: vec![Step::RenameVariable {
                old_name: "a".to_string(),
                new_name: "b".to_string(),
            }],
        };

        let run = run_case(temp.path(), &temp.path().join("results"), &case_path, &case)
            .expect("run case");

        assert_eq!(run.outcome, Outcome::Error);
        assert!(!run.results_dir.join(ACTUAL_FILE).exists());
    }
}
