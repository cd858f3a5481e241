//! Score assembled feature bundles with a pre-trained model.
//!
//! The `ScoringEngine` trait is the only view the pipeline has of the model:
//! a deterministic function from an [`EncodedFeatureBundle`] to a confidence
//! in `0.0..=1.0`.

use std::sync::Arc;

use thiserror::Error;

use crate::EncodedFeatureBundle;

/// Failures raised by a [`ScoringEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The model artefact never loaded; the service must not serve.
    #[error("scoring model unavailable: {reason}")]
    ModelUnavailable {
        /// Why the model could not be loaded.
        reason: String,
    },
    /// Scoring a well-formed bundle failed or timed out.
    #[error("inference failed: {cause}")]
    InferenceFailure {
        /// Description of the underlying failure.
        cause: String,
    },
}

impl ScoringError {
    /// Build a [`ScoringError::InferenceFailure`].
    pub fn inference(cause: impl Into<String>) -> Self {
        Self::InferenceFailure {
            cause: cause.into(),
        }
    }

    /// Build a [`ScoringError::ModelUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
        }
    }
}

/// Produce a confidence score for an encoded learner/course pair.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so one loaded model
/// can serve concurrent requests, and must be deterministic: the same bundle
/// always yields the same score.
///
/// # Examples
///
/// ```rust
/// use course_match_core::{EncodedFeatureBundle, ScoringEngine, ScoringError};
///
/// struct Neutral;
///
/// impl ScoringEngine for Neutral {
///     fn score(&self, _bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
///         Ok(0.5)
///     }
/// }
/// ```
pub trait ScoringEngine: Send + Sync {
    /// Score `bundle`, returning a confidence in `0.0..=1.0`.
    ///
    /// # Errors
    /// Returns [`ScoringError::ModelUnavailable`] when no model is loaded and
    /// [`ScoringError::InferenceFailure`] when the computation fails.
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError>;
}

impl<E: ScoringEngine + ?Sized> ScoringEngine for &E {
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        (**self).score(bundle)
    }
}

impl<E: ScoringEngine + ?Sized> ScoringEngine for Box<E> {
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        (**self).score(bundle)
    }
}

impl<E: ScoringEngine + ?Sized> ScoringEngine for Arc<E> {
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        (**self).score(bundle)
    }
}
