//! Artefact path resolution and JSON input/output shared by subcommands.

use camino::{Utf8Path, Utf8PathBuf};
use course_match_scorer::{ArtefactPaths, ENCODERS_FILE, MODEL_FILE, TwoTowerScoringEngine};
use course_match_core::RecommendationService;
use serde::{Serialize, de::DeserializeOwned};
use std::io::Write;

use crate::{ARG_ENCODERS, ARG_MODEL, CliError};

/// Resolved artefact locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArtefactConfig {
    /// Path to `encoders.json`.
    pub(crate) encoders: Utf8PathBuf,
    /// Path to `model.bin`.
    pub(crate) model: Utf8PathBuf,
}

impl ArtefactConfig {
    /// Apply the defaults: the directory is `.` and the file names are the
    /// standard artefact names resolved against it.
    pub(crate) fn from_options(
        artefacts_dir: Option<Utf8PathBuf>,
        encoders: Option<Utf8PathBuf>,
        model: Option<Utf8PathBuf>,
    ) -> Self {
        let dir = artefacts_dir.unwrap_or_else(|| Utf8PathBuf::from("."));
        let encoders_file = encoders.unwrap_or_else(|| Utf8PathBuf::from(ENCODERS_FILE));
        let model_file = model.unwrap_or_else(|| Utf8PathBuf::from(MODEL_FILE));
        let paths = ArtefactPaths::resolve(&dir, &encoders_file, &model_file);
        Self {
            encoders: paths.encoders,
            model: paths.model,
        }
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.encoders, ARG_ENCODERS)?;
        require_existing(&self.model, ARG_MODEL)?;
        Ok(())
    }

    pub(crate) fn load_service(
        &self,
    ) -> Result<RecommendationService<TwoTowerScoringEngine>, CliError> {
        self.validate_sources()?;
        let paths = ArtefactPaths {
            encoders: self.encoders.clone(),
            model: self.model.clone(),
        };
        Ok(course_match_scorer::load_service(&paths)?)
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match course_match_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a JSON document from disk.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let bytes = course_match_fs::read_artefact(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
