//! Labels command implementation.

use camino::Utf8PathBuf;
use clap::Parser;
use course_match_core::Field;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::artefacts::{ArtefactConfig, write_json};
use crate::{
    ARG_ARTEFACTS_DIR, ARG_ENCODERS, ARG_LABELS_FIELD, ARG_MODEL, CliError, ENV_LABELS_FIELD,
};

/// CLI arguments for the `labels` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the labels one field accepts, in trained order. \
                 The position of a label plus one is its model index.",
    about = "List the labels a field accepts"
)]
#[ortho_config(prefix = "COURSE_MATCH")]
pub(crate) struct LabelsArgs {
    /// Field to list: track, subject or course.
    #[arg(long = ARG_LABELS_FIELD, value_name = "field")]
    #[serde(default)]
    pub(crate) field: Option<Field>,
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

impl LabelsArgs {
    pub(crate) fn into_config(self) -> Result<LabelsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LabelsConfig::try_from(merged)
    }
}

/// Resolved `labels` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LabelsConfig {
    pub(crate) field: Field,
    pub(crate) artefacts: ArtefactConfig,
}

impl TryFrom<LabelsArgs> for LabelsConfig {
    type Error = CliError;

    fn try_from(args: LabelsArgs) -> Result<Self, Self::Error> {
        let field = args.field.ok_or(CliError::MissingArgument {
            field: ARG_LABELS_FIELD,
            env: ENV_LABELS_FIELD,
        })?;
        Ok(Self {
            field,
            artefacts: ArtefactConfig::from_options(args.artefacts_dir, args.encoders, args.model),
        })
    }
}

#[derive(Debug, Serialize)]
struct LabelListing<'a> {
    field: Field,
    labels: Vec<&'a str>,
}

pub(crate) fn run_labels_with(args: LabelsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    labels_with_config(&config, writer)
}

pub(crate) fn labels_with_config(
    config: &LabelsConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let service = config.artefacts.load_service()?;
    let listing = LabelListing {
        field: config.field,
        labels: service
            .registry()
            .vocabulary(config.field)
            .labels()
            .collect(),
    };
    write_json(writer, &listing)
}
