//! Error types raised while reading or writing scoring artefacts.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use thiserror::Error;

use course_match_core::{AgeScalerError, RecommendationError, ScoringError, VocabularyError};

use crate::model::ModelShapeError;

/// Errors raised while loading or persisting `encoders.json` and `model.bin`.
#[derive(Debug, Error)]
pub enum ArtefactError {
    /// Reading an artefact from disk failed.
    #[error("failed to read artefact at {path}")]
    Read {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Writing an artefact to disk failed.
    #[error("failed to write artefact at {path}")]
    Write {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// `encoders.json` is not valid JSON for the encoder schema.
    #[error("failed to parse encoders at {path}")]
    ParseEncoders {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Serialising the encoders failed.
    #[error("failed to serialise encoders for {path}")]
    SerialiseEncoders {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A vocabulary in `encoders.json` is empty, duplicated or misplaced.
    #[error("invalid vocabulary in {path}")]
    Vocabulary {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Underlying vocabulary error.
        #[source]
        source: VocabularyError,
    },
    /// The stored age scaler has non-finite parameters.
    #[error("invalid age scaler in {path}")]
    AgeScaler {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Underlying scaler error.
        #[source]
        source: AgeScalerError,
    },
    /// `max_history_len` is zero.
    #[error("max_history_len in {path} must be at least 1")]
    ZeroHistoryWindow {
        /// Artefact path.
        path: Utf8PathBuf,
    },
    /// `model.bin` could not be decoded.
    #[error("failed to decode model weights at {path}")]
    DecodeModel {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Encoding the model weights failed.
    #[error("failed to encode model weights for {path}")]
    EncodeModel {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// The model weights disagree with the vocabularies.
    #[error("model weights at {path} do not fit the encoders")]
    ModelShape {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Underlying shape error.
        #[source]
        source: ModelShapeError,
    },
}

impl ArtefactError {
    /// Render the error with its whole source chain on one line.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

impl From<ArtefactError> for ScoringError {
    fn from(error: ArtefactError) -> Self {
        Self::unavailable(error.chain())
    }
}

impl From<ArtefactError> for RecommendationError {
    fn from(error: ArtefactError) -> Self {
        Self::ModelUnavailable {
            reason: error.chain(),
        }
    }
}
