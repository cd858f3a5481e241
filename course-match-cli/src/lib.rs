//! Command-line interface for scoring courses with trained artefacts.
//!
//! Every subcommand loads `encoders.json` and `model.bin` from
//! `--artefacts-dir` (or the explicit `--encoders` and `--model` overrides),
//! builds one recommendation service and prints JSON to standard output.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod artefacts;
mod check;
mod error;
mod labels;
mod predict;
mod rank;

pub use error::CliError;

use check::{CheckArgs, run_check_with};
use labels::{LabelsArgs, run_labels_with};
use predict::{PredictArgs, run_predict_with};
use rank::{RankArgs, run_rank_with};

const ARG_ARTEFACTS_DIR: &str = "artefacts-dir";
const ARG_ENCODERS: &str = "encoders";
const ARG_MODEL: &str = "model";
const ARG_PREDICT_REQUEST: &str = "request";
const ARG_RANK_BATCH: &str = "batch";
const ARG_MIN_SCORE: &str = "min-score";
const ARG_LIMIT: &str = "limit";
const ARG_INCLUDE_COMPLETED: &str = "include-completed";
const ARG_LABELS_FIELD: &str = "field";
const ENV_PREDICT_REQUEST: &str = "COURSE_MATCH_CMDS_PREDICT_REQUEST_PATH";
const ENV_RANK_BATCH: &str = "COURSE_MATCH_CMDS_RANK_BATCH_PATH";
const ENV_LABELS_FIELD: &str = "COURSE_MATCH_CMDS_LABELS_FIELD";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, artefact
/// loading, scoring or writing the output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli.command, &mut stdout)
}

fn run_with(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Predict(args) => run_predict_with(args, writer),
        Command::Rank(args) => run_rank_with(args, writer),
        Command::Check(args) => run_check_with(args, writer),
        Command::Labels(args) => run_labels_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "course-match",
    about = "Score learner/course pairs with a trained two-tower model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one learner/course request.
    Predict(PredictArgs),
    /// Rank a catalogue of candidate courses for one learner.
    Rank(RankArgs),
    /// Load the artefacts and report what they contain.
    Check(CheckArgs),
    /// List the labels a field accepts.
    Labels(LabelsArgs),
}

#[cfg(test)]
mod tests;
