//! The `encoders.json` artefact: vocabularies, age scaler and history window.
#![forbid(unsafe_code)]

use std::num::NonZeroUsize;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use course_match_core::{
    AgeNormalizer, CategoricalEncoderRegistry, DEFAULT_HISTORY_WINDOW, EncoderVocabulary, Field,
};
use course_match_fs::{read_artefact, write_artefact};

use crate::ArtefactError;

/// Trained standard-scaler parameters for the learner's age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeScalerParams {
    /// Mean of the training ages.
    pub mean: f64,
    /// Standard deviation of the training ages.
    #[serde(alias = "stddev", alias = "std")]
    pub scale: f64,
}

/// On-disk form of everything the pipeline needs besides the model weights.
///
/// Labels are listed in trained order; the label at position `i` encodes to
/// `i + 1`.
///
/// ```json
/// {
///   "track": ["Sciences Maths (SM)", "Sciences SVT"],
///   "subject": ["Mathematiques", "SVT"],
///   "course": ["Course A", "Course B"],
///   "age_scaler": { "mean": 17.2, "scale": 1.4 },
///   "max_history_len": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderArtefact {
    /// Track labels.
    #[serde(alias = "filliere_enc", alias = "branch")]
    pub track: Vec<String>,
    /// Subject labels.
    #[serde(alias = "matiere_enc")]
    pub subject: Vec<String>,
    /// Course labels, shared by targets and history.
    #[serde(alias = "course_enc")]
    pub course: Vec<String>,
    /// Age scaler parameters.
    #[serde(alias = "scaler")]
    pub age_scaler: AgeScalerParams,
    /// History window `L`.
    #[serde(default = "default_history_len")]
    pub max_history_len: usize,
}

const fn default_history_len() -> usize {
    DEFAULT_HISTORY_WINDOW.get()
}

/// Validated pipeline inputs built from an [`EncoderArtefact`].
#[derive(Debug, Clone)]
pub struct LoadedEncoders {
    /// Vocabularies for the three categorical fields.
    pub registry: CategoricalEncoderRegistry,
    /// History window `L`.
    pub history_window: NonZeroUsize,
    /// Age normaliser.
    pub age: AgeNormalizer,
}

impl EncoderArtefact {
    /// Snapshot a registry and its companions into artefact form.
    #[must_use]
    pub fn from_parts(
        registry: &CategoricalEncoderRegistry,
        history_window: NonZeroUsize,
        age: AgeNormalizer,
    ) -> Self {
        let labels = |field: Field| -> Vec<String> {
            registry
                .vocabulary(field)
                .labels()
                .map(str::to_owned)
                .collect()
        };
        Self {
            track: labels(Field::Track),
            subject: labels(Field::Subject),
            course: labels(Field::Course),
            age_scaler: AgeScalerParams {
                mean: age.mean(),
                scale: age.scale(),
            },
            max_history_len: history_window.get(),
        }
    }

    /// Validate the artefact read from `path`.
    ///
    /// # Errors
    /// Returns [`ArtefactError::Vocabulary`], [`ArtefactError::AgeScaler`] or
    /// [`ArtefactError::ZeroHistoryWindow`], each naming `path`.
    pub fn into_loaded(self, path: &Utf8Path) -> Result<LoadedEncoders, ArtefactError> {
        let vocabulary_error = |source| ArtefactError::Vocabulary {
            path: path.to_path_buf(),
            source,
        };
        let registry = CategoricalEncoderRegistry::new(
            EncoderVocabulary::new(Field::Track, self.track).map_err(vocabulary_error)?,
            EncoderVocabulary::new(Field::Subject, self.subject).map_err(vocabulary_error)?,
            EncoderVocabulary::new(Field::Course, self.course).map_err(vocabulary_error)?,
        )
        .map_err(vocabulary_error)?;
        let age = AgeNormalizer::new(self.age_scaler.mean, self.age_scaler.scale).map_err(
            |source| ArtefactError::AgeScaler {
                path: path.to_path_buf(),
                source,
            },
        )?;
        let history_window = NonZeroUsize::new(self.max_history_len).ok_or_else(|| {
            ArtefactError::ZeroHistoryWindow {
                path: path.to_path_buf(),
            }
        })?;
        Ok(LoadedEncoders {
            registry,
            history_window,
            age,
        })
    }
}

/// Read and validate `encoders.json`.
///
/// # Errors
/// Returns [`ArtefactError`] when the file cannot be read, parsed or
/// validated.
pub fn read_encoders(path: &Utf8Path) -> Result<LoadedEncoders, ArtefactError> {
    let bytes = read_artefact(path).map_err(|source| ArtefactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let artefact: EncoderArtefact =
        serde_json::from_slice(&bytes).map_err(|source| ArtefactError::ParseEncoders {
            path: path.to_path_buf(),
            source,
        })?;
    let loaded = artefact.into_loaded(path)?;
    log::info!(
        "loaded encoders from {path}: {} tracks, {} subjects, {} courses, history window {}",
        loaded.registry.size(Field::Track),
        loaded.registry.size(Field::Subject),
        loaded.registry.size(Field::Course),
        loaded.history_window
    );
    Ok(loaded)
}

/// Write `artefact` to `path` as pretty-printed JSON.
///
/// # Errors
/// Returns [`ArtefactError`] when serialisation or the write fails.
pub fn write_encoders(path: &Utf8Path, artefact: &EncoderArtefact) -> Result<(), ArtefactError> {
    let bytes =
        serde_json::to_vec_pretty(artefact).map_err(|source| ArtefactError::SerialiseEncoders {
            path: path.to_path_buf(),
            source,
        })?;
    write_artefact(path, &bytes).map_err(|source| ArtefactError::Write {
        path: path.to_path_buf(),
        source,
    })
}
