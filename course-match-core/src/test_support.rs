//! Scoring engine doubles for tests and downstream crates.
//!
//! Enabled for this crate's own tests and, for dependants, through the
//! `test-support` feature.

use crate::{EncodedFeatureBundle, ScoringEngine, ScoringError};

/// Returns the same score for every bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScoringEngine {
    score: f32,
}

impl FixedScoringEngine {
    /// Engine that always answers `score`.
    #[must_use]
    pub const fn new(score: f32) -> Self {
        Self { score }
    }
}

impl ScoringEngine for FixedScoringEngine {
    fn score(&self, _bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        Ok(self.score)
    }
}

/// Delegates scoring to a closure.
pub struct FnScoringEngine<F> {
    score: F,
}

impl<F> FnScoringEngine<F>
where
    F: Fn(&EncodedFeatureBundle) -> Result<f32, ScoringError> + Send + Sync,
{
    /// Wrap `score` as an engine.
    pub const fn new(score: F) -> Self {
        Self { score }
    }
}

impl<F> std::fmt::Debug for FnScoringEngine<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnScoringEngine").finish_non_exhaustive()
    }
}

impl<F> ScoringEngine for FnScoringEngine<F>
where
    F: Fn(&EncodedFeatureBundle) -> Result<f32, ScoringError> + Send + Sync,
{
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        (self.score)(bundle)
    }
}

/// Stands in for a model that failed to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnavailableScoringEngine {
    reason: Option<String>,
}

impl UnavailableScoringEngine {
    /// Report `reason` on every call.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl ScoringEngine for UnavailableScoringEngine {
    fn score(&self, _bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        Err(ScoringError::unavailable(
            self.reason.as_deref().unwrap_or("no model loaded"),
        ))
    }
}
