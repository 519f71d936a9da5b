//! The `shipval` command line.
//!
//! `validate` prints a Validation Report, `shapes` prints the compiled
//! shapes. Logs go to stderr, JSON to stdout.

use clap::{Parser, Subcommand};
use shipval_normalize::Mode;
use shipval_report::RunOutcome;
use shipval_session::{loader, SessionError, ValidationRun};
use shipval_shape::{compile_all, shapes_to_json, ShapeError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Exit code for configuration and loading errors.
pub const EXIT_CONFIG_ERROR: i32 = 3;

#[derive(Debug, Parser)]
#[command(name = "shipval", version, about = "Validate ship design data against rule constraints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize raw records and evaluate the enabled constraints.
    Validate {
        #[arg(long)]
        config: PathBuf,
        /// Run input JSON: entities and raw field records.
        #[arg(long)]
        input: PathBuf,
        /// Abort on the first normalization issue.
        #[arg(long)]
        strict: bool,
        /// Enable only these requirement sets (repeatable).
        #[arg(long = "requirement-set")]
        requirement_sets: Vec<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the catalog compiled to shapes.
    Shapes {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] shipval_session::ConfigError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Report(#[from] shipval_report::ReportError),
}

/// Process exit code for a run outcome.
pub fn exit_code(outcome: RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Success | RunOutcome::SuccessWithWarnings => 0,
        RunOutcome::Failure => 1,
        RunOutcome::Aborted => 2,
    }
}

/// Run a command, returning what to print on stdout and the exit code.
pub fn execute(cli: Cli) -> Result<(String, i32), CliError> {
    match cli.command {
        Command::Validate {
            config,
            input,
            strict,
            requirement_sets,
            pretty,
        } => {
            let (mut config, base) = loader::load_config(&config)?;
            if strict {
                config.normalization.mode = Some(Mode::Strict);
            }
            if !requirement_sets.is_empty() {
                config.evaluation.requirement_sets = requirement_sets;
            }
            let settings = config.run_settings()?;
            let snapshot = Arc::new(loader::load_snapshot(&config, &base)?);
            let input = loader::read_input(&input)?;

            let mut run = ValidationRun::new(snapshot, settings);
            let report = run.execute(&input)?;
            tracing::info!(state = %run.state(), outcome = %report.outcome, "run finished");
            Ok((report.to_json(pretty)?, exit_code(report.outcome)))
        }
        Command::Shapes { config, pretty } => {
            let (config, base) = loader::load_config(&config)?;
            let snapshot = loader::load_snapshot(&config, &base)?;
            let shapes = compile_all(snapshot.catalog().constraints())?;
            Ok((shapes_to_json(&shapes, pretty)?, 0))
        }
    }
}
