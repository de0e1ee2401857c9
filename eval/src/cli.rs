//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::case::{CaseFile, discover_cases, validate_case_id};
use crate::outcome::Outcome;
use crate::report::aggregate;
use crate::run::run_case;

fn fixtures_dir(repo_root: &Path) -> PathBuf {
    repo_root.join("fixtures")
}

fn cases_dir(repo_root: &Path) -> PathBuf {
    fixtures_dir(repo_root).join("cases")
}

fn results_base(repo_root: &Path) -> PathBuf {
    repo_root.join("eval").join("results")
}

/// List all available cases.
pub fn list_cases(repo_root: &Path) -> Result<()> {
    for (_, case) in discover_cases(&cases_dir(repo_root))? {
        println!("{}", case.case.id);
    }
    Ok(())
}

/// Run one case by id, or every discovered case.
///
/// Fails after running everything if any case did not pass.
pub fn run_cases(repo_root: &Path, case_id: Option<&str>) -> Result<()> {
    let cases = match case_id {
        Some(case_id) => {
            validate_case_id(case_id)?;
            let case_path = cases_dir(repo_root).join(format!("{case_id}.toml"));
            if !case_path.exists() {
                bail!("case {} not found at {}", case_id, case_path.display());
            }
            let case = CaseFile::load(&case_path).context("load case")?;
            vec![(case_path, case)]
        }
        None => discover_cases(&cases_dir(repo_root))?,
    };
    debug!(cases = cases.len(), "cases loaded");

    let mut not_passed = 0;
    for (case_path, case) in &cases {
        let outcome = run_case(
            &fixtures_dir(repo_root),
            &results_base(repo_root),
            case_path,
            case,
        )
        .with_context(|| format!("run case {}", case.case.id))?;
        println!(
            "run: case={} eval_run_id={} outcome={:?} results={}",
            case.case.id,
            outcome.eval_run_id,
            outcome.outcome,
            outcome.results_dir.display()
        );
        if outcome.outcome != Outcome::Pass {
            not_passed += 1;
        }
    }
    info!(cases = cases.len(), not_passed, "runs finished");

    if not_passed > 0 {
        bail!("{} of {} case(s) did not pass", not_passed, cases.len());
    }
    Ok(())
}

/// Show aggregated results for a case.
pub fn report_case(repo_root: &Path, case_id: &str) -> Result<()> {
    validate_case_id(case_id)?;
    let (summary, warnings) = aggregate(&results_base(repo_root).join(case_id))?;
    println!("report: case={} runs={}", case_id, summary.runs);
    println!(
        "report: pass={} fail={} no_match={} error={}",
        summary.pass, summary.fail, summary.no_match, summary.error
    );
    if let Some(avg) = summary.avg_duration_secs {
        println!("report: avg_duration_secs={:.3}", avg);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

/// Remove stored results for a case.
pub fn clean_case(repo_root: &Path, case_id: &str) -> Result<()> {
    validate_case_id(case_id)?;
    let case_results = results_base(repo_root).join(case_id);
    if case_results.exists() {
        std::fs::remove_dir_all(&case_results)
            .with_context(|| format!("remove {}", case_results.display()))?;
    }

    println!("clean: case={} results={}", case_id, case_results.display());
    Ok(())
}
