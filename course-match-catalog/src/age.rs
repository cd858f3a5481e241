//! Caller-side defaulting of learner ages before normalisation.
#![forbid(unsafe_code)]

/// Replaces missing or implausible ages before they reach the pipeline.
///
/// A missing age becomes [`default_age`](Self::default_age). An age that is
/// not finite, not above [`min_exclusive`](Self::min_exclusive) or above
/// [`max_inclusive`](Self::max_inclusive) becomes
/// [`fallback_age`](Self::fallback_age), which sits close to the training
/// mean.
///
/// # Examples
/// ```
/// use course_match_catalog::AgePolicy;
///
/// let policy = AgePolicy::default();
/// assert_eq!(policy.resolve(None), 20.0);
/// assert_eq!(policy.resolve(Some(9.0)), 17.0);
/// assert_eq!(policy.resolve(Some(18.0)), 18.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgePolicy {
    /// Age assumed when none is known.
    pub default_age: f64,
    /// Age substituted for out-of-range values.
    pub fallback_age: f64,
    /// Ages at or below this are out of range.
    pub min_exclusive: f64,
    /// Ages above this are out of range.
    pub max_inclusive: f64,
}

impl Default for AgePolicy {
    fn default() -> Self {
        Self {
            default_age: 20.0,
            fallback_age: 17.0,
            min_exclusive: 10.0,
            max_inclusive: 80.0,
        }
    }
}

impl AgePolicy {
    /// Age to feed the pipeline for `age`.
    #[must_use]
    pub fn resolve(&self, age: Option<f64>) -> f64 {
        match age {
            None => self.default_age,
            Some(value)
                if value.is_finite() && value > self.min_exclusive && value <= self.max_inclusive =>
            {
                value
            }
            Some(value) => {
                log::debug!("age {value} out of range; using {}", self.fallback_age);
                self.fallback_age
            }
        }
    }
}
