//! Standard-score normalisation of the learner's age.

use thiserror::Error;

/// Errors raised when the trained scaler parameters are unusable.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AgeScalerError {
    /// The trained mean was NaN or infinite.
    #[error("age scaler mean {0} is not finite")]
    NonFiniteMean(f64),
    /// The trained standard deviation was NaN or infinite.
    #[error("age scaler standard deviation {0} is not finite")]
    NonFiniteScale(f64),
}

/// Applies the trained `(age - mean) / stddev` transform.
///
/// The normaliser neither clamps nor validates ages; callers substitute a
/// sensible default before invoking the pipeline.
///
/// # Examples
/// ```
/// use course_match_core::AgeNormalizer;
///
/// # fn main() -> Result<(), course_match_core::AgeScalerError> {
/// let normalizer = AgeNormalizer::new(17.0, 2.0)?;
/// assert_eq!(normalizer.normalize(21.0), 2.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeNormalizer {
    mean: f64,
    scale: f64,
}

impl AgeNormalizer {
    /// Build a normaliser from trained parameters.
    ///
    /// A zero standard deviation means the training ages were constant; it is
    /// replaced by `1.0` so the transform degenerates to a shift.
    ///
    /// # Errors
    /// Returns [`AgeScalerError`] when either parameter is not finite.
    pub fn new(mean: f64, stddev: f64) -> Result<Self, AgeScalerError> {
        if !mean.is_finite() {
            return Err(AgeScalerError::NonFiniteMean(mean));
        }
        if !stddev.is_finite() {
            return Err(AgeScalerError::NonFiniteScale(stddev));
        }
        let scale = if stddev == 0.0 { 1.0 } else { stddev };
        Ok(Self { mean, scale })
    }

    /// Trained mean.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Effective standard deviation after the zero-scale substitution.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Normalise `age`; the model consumes single precision.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        reason = "standard scaling is float arithmetic narrowed to the model's f32 input"
    )]
    #[must_use]
    pub fn normalize(&self, age: f64) -> f32 {
        ((age - self.mean) / self.scale) as f32
    }
}
