mod case;
mod cli;
mod outcome;
mod report;
mod results;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "eval",
    version,
    about = "Fixture harness for refactor transformations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List case ids under `fixtures/cases/`.
    List,
    /// Run one case, or every case when no id is given.
    Run { case_id: Option<String> },
    /// Aggregate stored results for a case.
    Report { case_id: String },
    /// Remove stored results for a case.
    Clean { case_id: String },
}

fn main() -> Result<()> {
    refactor::logging::init();

    let cli = Cli::parse();
    let repo_root = std::env::current_dir()?;
    match cli.command {
        Command::List => cli::list_cases(&repo_root),
        Command::Run { case_id } => cli::run_cases(&repo_root, case_id.as_deref()),
        Command::Report { case_id } => cli::report_case(&repo_root, &case_id),
        Command::Clean { case_id } => cli::clean_case(&repo_root, &case_id),
    }
}
