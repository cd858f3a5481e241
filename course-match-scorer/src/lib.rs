//! Scoring artefacts and the two-tower scoring engine.
//!
//! A trained model ships as two files:
//! - **`encoders.json`** holds the track, subject and course vocabularies in
//!   trained order, the age scaler and the history window. It is plain JSON
//!   so operators can inspect and diff it.
//! - **`model.bin`** holds the [`TwoTowerWeights`] serialised with `bincode`.
//!
//! [`load_service`] reads both, checks the weights against the vocabularies
//! and returns a ready [`RecommendationService`]. Any failure aborts the load;
//! a service is never built around a partially valid model.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use course_match_core::RecommendationRequest;
//! use course_match_scorer::{ArtefactPaths, load_service};
//!
//! let paths = ArtefactPaths::in_dir(Utf8Path::new("artefacts"));
//! let service = load_service(&paths).expect("load scoring artefacts");
//! let request = RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT");
//! let prediction = service.predict(&request).expect("score request");
//! println!("{:?}", prediction.response());
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use bincode::Options;
use camino::{Utf8Path, Utf8PathBuf};
use course_match_core::RecommendationService;
use course_match_fs::{read_artefact, resolve_in, write_artefact};

mod encoders;
mod engine;
mod error;
mod model;
#[cfg(test)]
mod test_fixtures;

pub use encoders::{
    AgeScalerParams, EncoderArtefact, LoadedEncoders, read_encoders, write_encoders,
};
pub use engine::TwoTowerScoringEngine;
pub use error::ArtefactError;
pub use model::{
    Activation, DenseLayer, Embedding, ModelShapeError, Tower, TwoTowerWeights,
};

/// Default file name of the encoder artefact.
pub const ENCODERS_FILE: &str = "encoders.json";
/// Default file name of the model weights.
pub const MODEL_FILE: &str = "model.bin";

/// Bincode options used for serializing and deserializing model weights.
pub(crate) fn bincode_options() -> impl bincode::Options {
    bincode::DefaultOptions::new()
}

/// Public helper exposing the bincode configuration used for `model.bin`.
#[must_use]
pub fn model_bincode_options() -> impl bincode::Options {
    bincode_options()
}

/// Locations of the two scoring artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactPaths {
    /// Path of `encoders.json`.
    pub encoders: Utf8PathBuf,
    /// Path of `model.bin`.
    pub model: Utf8PathBuf,
}

impl ArtefactPaths {
    /// Default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Utf8Path) -> Self {
        Self::resolve(dir, Utf8Path::new(ENCODERS_FILE), Utf8Path::new(MODEL_FILE))
    }

    /// Resolve explicit file names against `dir`; absolute names are kept.
    #[must_use]
    pub fn resolve(dir: &Utf8Path, encoders: &Utf8Path, model: &Utf8Path) -> Self {
        Self {
            encoders: resolve_in(dir, encoders),
            model: resolve_in(dir, model),
        }
    }
}

/// Decode `model.bin` without validating it against any vocabulary.
///
/// # Errors
/// Returns [`ArtefactError::Read`] or [`ArtefactError::DecodeModel`].
pub fn read_model(path: &Utf8Path) -> Result<TwoTowerWeights, ArtefactError> {
    let bytes = read_artefact(path).map_err(|source| ArtefactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    bincode_options()
        .deserialize(&bytes)
        .map_err(|source| ArtefactError::DecodeModel {
            path: path.to_path_buf(),
            source,
        })
}

/// Persist `weights` to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns [`ArtefactError::EncodeModel`] or [`ArtefactError::Write`].
pub fn write_model(path: &Utf8Path, weights: &TwoTowerWeights) -> Result<(), ArtefactError> {
    let bytes = bincode_options()
        .serialize(weights)
        .map_err(|source| ArtefactError::EncodeModel {
            path: path.to_path_buf(),
            source,
        })?;
    write_artefact(path, &bytes).map_err(|source| ArtefactError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load both artefacts and build a service around the two-tower engine.
///
/// # Errors
/// Returns the first [`ArtefactError`] met while reading or validating the
/// encoders or the model.
pub fn load_service(
    paths: &ArtefactPaths,
) -> Result<RecommendationService<TwoTowerScoringEngine>, ArtefactError> {
    let LoadedEncoders {
        registry,
        history_window,
        age,
    } = read_encoders(&paths.encoders)?;
    let weights = read_model(&paths.model)?;
    let engine = TwoTowerScoringEngine::new(weights, &registry).map_err(|source| {
        ArtefactError::ModelShape {
            path: paths.model.clone(),
            source,
        }
    })?;
    log::info!(
        "loaded two-tower model from {} ({} learner layers, {} course layers)",
        paths.model,
        engine.weights().learner_layers.len(),
        engine.weights().course_layers.len()
    );
    Ok(RecommendationService::new(
        registry,
        history_window,
        age,
        engine,
    ))
}
