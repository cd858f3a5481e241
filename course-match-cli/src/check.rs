//! Check command implementation.

use camino::Utf8PathBuf;
use clap::Parser;
use course_match_core::{Field, RECOMMENDATION_THRESHOLD};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::artefacts::{ArtefactConfig, write_json};
use crate::{ARG_ARTEFACTS_DIR, ARG_ENCODERS, ARG_MODEL, CliError};

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load encoders.json and model.bin, validate the weights \
                 against the vocabularies and print a readiness report. \
                 Exits non-zero when the artefacts cannot serve requests.",
    about = "Validate the scoring artefacts"
)]
#[ortho_config(prefix = "COURSE_MATCH")]
pub(crate) struct CheckArgs {
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
}

impl CheckArgs {
    pub(crate) fn into_config(self) -> Result<ArtefactConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(ArtefactConfig::from(merged))
    }
}

impl From<CheckArgs> for ArtefactConfig {
    fn from(args: CheckArgs) -> Self {
        Self::from_options(args.artefacts_dir, args.encoders, args.model)
    }
}

/// Readiness report printed by `check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CheckReport {
    pub(crate) status: &'static str,
    pub(crate) encoders: Utf8PathBuf,
    pub(crate) model: Utf8PathBuf,
    pub(crate) tracks: usize,
    pub(crate) subjects: usize,
    pub(crate) courses: usize,
    pub(crate) history_window: usize,
    pub(crate) learner_layers: usize,
    pub(crate) course_layers: usize,
    pub(crate) threshold: f32,
}

pub(crate) fn run_check_with(args: CheckArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    check_with_config(&config, writer)
}

pub(crate) fn check_with_config(
    config: &ArtefactConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let service = config.load_service()?;
    let registry = service.registry();
    let weights = service.engine().weights();
    let report = CheckReport {
        status: "ready",
        encoders: config.encoders.clone(),
        model: config.model.clone(),
        tracks: registry.size(Field::Track),
        subjects: registry.size(Field::Subject),
        courses: registry.size(Field::Course),
        history_window: service.history_window(),
        learner_layers: weights.learner_layers.len(),
        course_layers: weights.course_layers.len(),
        threshold: RECOMMENDATION_THRESHOLD,
    };
    write_json(writer, &report)
}
