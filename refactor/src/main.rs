//! Command-line refactoring for C# files.
//!
//! Rewrites files in place (atomically) unless `--dry-run` is given, in which
//! case the refactored source is printed to stdout.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use refactor::exit_codes;
use refactor::inspect::{dump_uast, generate};
use refactor::io::config::{DEFAULT_CONFIG_FILE, RefactorConfig, load_config, write_config};
use refactor::logging;
use refactor::session::{
    ExtractRequest, RefactorOutcome, RenameRequest, extract_variable, rename_variable,
};

#[derive(Parser)]
#[command(
    name = "refactor",
    version,
    about = "Tree-sitter based refactorings for C# source files"
)]
struct Cli {
    /// Path to the TOML config file (defaults apply if it does not exist).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rename every occurrence of a variable.
    RenameVariable {
        file: PathBuf,
        old_name: String,
        new_name: String,
        /// Print the result instead of writing the file.
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract an expression into a new local variable.
    ExtractVariable {
        file: PathBuf,
        /// Exact source text of the expression.
        expression: String,
        new_name: String,
        /// Which extractable occurrence to use (1-based).
        #[arg(long, default_value_t = 1)]
        occurrence: usize,
        /// Print the result instead of writing the file.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the lowered syntax tree as JSON.
    Uast { file: PathBuf },
    /// Print C# regenerated from the lowered syntax tree.
    Codegen { file: PathBuf },
    /// Write a config file with default values.
    InitConfig {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::RenameVariable {
            file,
            old_name,
            new_name,
            dry_run,
        } => {
            let config = load_config(&cli.config)?;
            let request = RenameRequest {
                path: file,
                old_name,
                new_name,
                dry_run,
            };
            let outcome = rename_variable(&request, &config)?;
            Ok(report("rename-variable", &request.path, &outcome, dry_run))
        }
        Command::ExtractVariable {
            file,
            expression,
            new_name,
            occurrence,
            dry_run,
        } => {
            let config = load_config(&cli.config)?;
            let request = ExtractRequest {
                path: file,
                expression,
                new_name,
                occurrence,
                dry_run,
            };
            let outcome = extract_variable(&request, &config)?;
            Ok(report("extract-variable", &request.path, &outcome, dry_run))
        }
        Command::Uast { file } => {
            println!("{}", dump_uast(&file)?);
            Ok(exit_codes::OK)
        }
        Command::Codegen { file } => {
            let config = load_config(&cli.config)?;
            println!("{}", generate(&file, &config)?);
            Ok(exit_codes::OK)
        }
        Command::InitConfig { force } => {
            cmd_init_config(&cli.config, force)?;
            Ok(exit_codes::OK)
        }
    }
}

fn report(command: &str, path: &Path, outcome: &RefactorOutcome, dry_run: bool) -> i32 {
    match outcome {
        RefactorOutcome::NoMatch => {
            eprintln!("{command}: file={} no match", path.display());
            exit_codes::NO_MATCH
        }
        RefactorOutcome::Applied { edits, source } => {
            if dry_run {
                print!("{source}");
            }
            eprintln!("{command}: file={} edits={}", path.display(), edits.len());
            exit_codes::OK
        }
    }
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    write_config(path, &RefactorConfig::default())?;
    println!("wrote {}", path.display());
    Ok(())
}
