//! Predict command implementation.

use camino::Utf8PathBuf;
use clap::Parser;
use course_match_core::RecommendationRequest;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::artefacts::{ArtefactConfig, read_json, require_existing, write_json};
use crate::{
    ARG_ARTEFACTS_DIR, ARG_ENCODERS, ARG_MODEL, ARG_PREDICT_REQUEST, CliError,
    ENV_PREDICT_REQUEST,
};

/// CLI arguments for the `predict` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Score one learner/course pair. The request is a JSON \
                 object with learner_track, learner_age, learner_history, \
                 target_course_name and target_subject. Unknown track, \
                 subject or course labels print an error payload listing \
                 the accepted values and exit with status 2.",
    about = "Score one learner/course request"
)]
#[ortho_config(prefix = "COURSE_MATCH")]
pub(crate) struct PredictArgs {
    /// Path to a JSON file containing the request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
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

impl PredictArgs {
    pub(crate) fn into_config(self) -> Result<PredictConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PredictConfig::try_from(merged)
    }
}

/// Resolved `predict` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PredictConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Artefact locations.
    pub(crate) artefacts: ArtefactConfig,
}

impl PredictConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_PREDICT_REQUEST)?;
        self.artefacts.validate_sources()
    }
}

impl TryFrom<PredictArgs> for PredictConfig {
    type Error = CliError;

    fn try_from(args: PredictArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PREDICT_REQUEST,
            env: ENV_PREDICT_REQUEST,
        })?;
        Ok(Self {
            request_path,
            artefacts: ArtefactConfig::from_options(args.artefacts_dir, args.encoders, args.model),
        })
    }
}

pub(crate) fn run_predict_with(args: PredictArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    predict_with_config(&config, writer)
}

pub(crate) fn predict_with_config(
    config: &PredictConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    config.validate_sources()?;
    let request: RecommendationRequest = read_json(&config.request_path)?;
    let service = config.artefacts.load_service()?;
    match service.predict(&request) {
        Ok(prediction) => write_json(writer, &prediction.response()),
        Err(err) if err.is_client_error() => {
            write_json(writer, &err.payload())?;
            Err(CliError::Prediction(err))
        }
        Err(err) => Err(CliError::Prediction(err)),
    }
}
