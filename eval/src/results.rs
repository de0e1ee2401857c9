//! Result capture and persistence.
//!
//! Writes run metadata and the produced text to the results directory for
//! later analysis.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::outcome::Outcome;

/// Name of the produced text inside a run directory.
pub const ACTUAL_FILE: &str = "actual.cs";

/// Input for capturing results from a completed run.
#[derive(Debug)]
pub struct CaptureInput<'a> {
    pub case_id: &'a str,
    pub case_path: &'a Path,
    pub eval_run_id: &'a str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: Outcome,
    /// Final text after all steps, when the steps completed.
    pub actual: Option<&'a str>,
    /// Errors from running the steps.
    pub errors: Vec<String>,
}

/// Metadata for an eval run, persisted to `meta.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvalMeta {
    pub case_id: String,
    pub eval_run_id: String,
    /// SHA-256 hash of the case file for reproducibility tracking.
    pub case_hash: String,
    pub outcome: Option<Outcome>,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub errors: Vec<String>,
}

/// Write `meta.json` (and `actual.cs` when there is output) for one run.
#[instrument(skip_all, fields(case_id = %input.case_id, eval_run_id = %input.eval_run_id))]
pub fn capture_results(base_dir: &Path, input: &CaptureInput<'_>) -> Result<PathBuf> {
    let results_dir = results_dir(base_dir, input.case_id, input.eval_run_id);
    fs::create_dir_all(&results_dir)
        .with_context(|| format!("create results dir {}", results_dir.display()))?;

    let mut errors = input.errors.clone();

    let case_hash = match file_sha256(input.case_path) {
        Ok(hash) => hash,
        Err(err) => {
            errors.push(format!("case hash: {err}"));
            String::new()
        }
    };

    if let Some(actual) = input.actual {
        let actual_path = results_dir.join(ACTUAL_FILE);
        if let Err(err) = fs::write(&actual_path, actual) {
            errors.push(format!("{ACTUAL_FILE}: write failed: {err}"));
        }
    }

    if !errors.is_empty() {
        warn!(errors = ?errors, "run recorded errors");
    }

    let duration = input.finished_at - input.started_at;
    let meta = EvalMeta {
        case_id: input.case_id.to_string(),
        eval_run_id: input.eval_run_id.to_string(),
        case_hash,
        outcome: Some(input.outcome),
        start_time: input.started_at.to_rfc3339(),
        end_time: input.finished_at.to_rfc3339(),
        duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        errors,
    };

    write_meta(&results_dir.join("meta.json"), &meta)?;
    debug!(results_dir = %results_dir.display(), "results captured");
    Ok(results_dir)
}

pub fn results_dir(base_dir: &Path, case_id: &str, eval_run_id: &str) -> PathBuf {
    base_dir.join(case_id).join(eval_run_id)
}

pub fn write_meta(path: &Path, meta: &EvalMeta) -> Result<()> {
    let contents = serde_json::to_string_pretty(meta).context("serialize meta")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write meta {}", path.display()))?;
    Ok(())
}

fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn results_dir_is_stable() {
        let base = Path::new("/tmp/results");
        let dir = results_dir(base, "case", "run-1");
        assert_eq!(dir, PathBuf::from("/tmp/results/case/run-1"));
    }

    #[test]
    fn writes_meta_and_actual() {
        let temp = tempdir().expect("tempdir");
        let case_path = temp.path().join("case.toml");
        fs::write(&case_path, "[case]\nid = 'case'\n").expect("case");

        let input = CaptureInput {
            case_id: "case",
            case_path: &case_path,
            eval_run_id: "eval-1",
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: Outcome::Fail,
            actual: Some("class T { }\n"),
            errors: Vec::new(),
        };

        let output_dir = capture_results(&temp.path().join("results"), &input).expect("capture");

        assert_eq!(
            fs::read_to_string(output_dir.join(ACTUAL_FILE)).expect("actual"),
            "class T { }\n"
        );
        let meta: EvalMeta = serde_json::from_str(
            &fs::read_to_string(output_dir.join("meta.json")).expect("meta"),
        )
        .expect("parse meta");
        assert_eq!(meta.outcome, Some(Outcome::Fail));
        assert_eq!(meta.case_hash.len(), 64);
        assert!(meta.errors.is_empty());
    }

    #[test]
    fn missing_case_file_is_recorded_not_fatal() {
        let temp = tempdir().expect("tempdir");
        let input = CaptureInput {
            case_id: "case",
            case_path: &temp.path().join("absent.toml"),
            eval_run_id: "eval-1",
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: Outcome::Error,
            actual: None,
            errors: vec!["parse failed".to_string()],
        };

        let output_dir = capture_results(temp.path(), &input).expect("capture");

        assert!(!output_dir.join(ACTUAL_FILE).exists());
        let meta: EvalMeta = serde_json::from_str(
            &fs::read_to_string(output_dir.join("meta.json")).expect("meta"),
        )
        .expect("parse meta");
        assert_eq!(meta.errors.len(), 2);
        assert!(meta.errors[1].starts_with("case hash:"));
    }
}
