//! Rank command implementation.

use camino::Utf8PathBuf;
use clap::Parser;
use course_match_catalog::{CandidateCourse, CatalogRanker, LearnerProfile, RankOptions};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::artefacts::{ArtefactConfig, read_json, require_existing, write_json};
use crate::{
    ARG_ARTEFACTS_DIR, ARG_ENCODERS, ARG_INCLUDE_COMPLETED, ARG_LIMIT, ARG_MIN_SCORE, ARG_MODEL,
    ARG_RANK_BATCH, CliError, ENV_RANK_BATCH,
};

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank candidate courses for one learner. The batch is a \
                 JSON object with a learner profile (track, age, history) \
                 and a list of candidates (id, title, subject, completed). \
                 Candidates that cannot be scored are reported separately.",
    about = "Rank a catalogue of courses for one learner"
)]
#[ortho_config(prefix = "COURSE_MATCH")]
pub(crate) struct RankArgs {
    /// Path to a JSON file containing the learner and candidates.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) batch_path: Option<Utf8PathBuf>,
    /// Directory containing `encoders.json` and `model.bin`.
    #[arg(long = ARG_ARTEFACTS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) artefacts_dir: Option<Utf8PathBuf>,
    /// Override the path to the encoder artefact.
    #[arg(long = ARG_ENCODERS, value_name = "path")]
    #[serde(default)]
    pub(crate) encoders: Option<Utf8PathBuf>,
    /// Override the path to the model weights.
    #[arg(long = ARG_MODEL, value_name = "path")]
    #[serde(default)]
    pub(crate) model: Option<Utf8PathBuf>,
    /// Lowest displayed confidence kept in the ranking (default 0.6).
    #[arg(long = ARG_MIN_SCORE, value_name = "score")]
    #[serde(default)]
    pub(crate) min_score: Option<f64>,
    /// Maximum number of courses returned (default 10).
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Score courses the learner already completed.
    #[arg(
        long = ARG_INCLUDE_COMPLETED,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) include_completed: Option<bool>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RankConfig {
    /// Path to the JSON batch file.
    pub(crate) batch_path: Utf8PathBuf,
    /// Artefact locations.
    pub(crate) artefacts: ArtefactConfig,
    /// Options given on the command line; unset ones defer to the batch file.
    pub(crate) overrides: RankOverrides,
}

/// Ranking options set through flags, config files or the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RankOverrides {
    pub(crate) min_score: Option<f64>,
    pub(crate) limit: Option<usize>,
    pub(crate) include_completed: Option<bool>,
}

impl RankOverrides {
    fn apply(self, base: RankOptions) -> RankOptions {
        RankOptions {
            min_score: self.min_score.unwrap_or(base.min_score),
            limit: self.limit.unwrap_or(base.limit),
            exclude_completed: self
                .include_completed
                .map_or(base.exclude_completed, |include| !include),
        }
    }
}

impl RankConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.batch_path, ARG_RANK_BATCH)?;
        self.artefacts.validate_sources()
    }
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let batch_path = args.batch_path.ok_or(CliError::MissingArgument {
            field: ARG_RANK_BATCH,
            env: ENV_RANK_BATCH,
        })?;
        if let Some(value) = args.min_score
            && !(0.0..=1.0).contains(&value)
        {
            return Err(CliError::InvalidMinScore { value });
        }
        Ok(Self {
            batch_path,
            artefacts: ArtefactConfig::from_options(args.artefacts_dir, args.encoders, args.model),
            overrides: RankOverrides {
                min_score: args.min_score,
                limit: args.limit,
                include_completed: args.include_completed,
            },
        })
    }
}

/// Contents of a batch file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RankBatch {
    pub(crate) learner: LearnerProfile,
    pub(crate) candidates: Vec<CandidateCourse>,
    #[serde(default)]
    pub(crate) options: RankOptions,
}

pub(crate) fn run_rank_with(args: RankArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    rank_with_config(&config, writer)
}

pub(crate) fn rank_with_config(config: &RankConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    config.validate_sources()?;
    let batch: RankBatch = read_json(&config.batch_path)?;
    let options = config.overrides.apply(batch.options);
    let service = config.artefacts.load_service()?;
    let ranking =
        CatalogRanker::default().rank(&service, &batch.learner, &batch.candidates, options)?;
    log::info!(
        "ranked {} candidates: {} kept, {} skipped",
        batch.candidates.len(),
        ranking.total_recommendations,
        ranking.skipped.len()
    );
    write_json(writer, &ranking)
}
