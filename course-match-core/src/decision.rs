//! Threshold decision over a confidence score.

/// Confidence a course must strictly exceed to be recommended.
pub const RECOMMENDATION_THRESHOLD: f32 = 0.65;

/// Caller-facing verdict attached to every score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Verdict {
    /// The course is recommended.
    Relevant,
    /// The course is not recommended.
    NotRelevant,
}

impl Verdict {
    /// Return the verdict's wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevant => "relevant",
            Self::NotRelevant => "not_relevant",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying the [`DecisionPolicy`] to a confidence.
///
/// `recommended` always equals `confidence > RECOMMENDATION_THRESHOLD`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    confidence: f32,
    recommended: bool,
    message: Verdict,
}

impl ScoreResult {
    /// Model confidence in `0.0..=1.0`.
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Whether the course is recommended.
    #[must_use]
    pub const fn recommended(&self) -> bool {
        self.recommended
    }

    /// Verdict matching [`recommended`](Self::recommended).
    #[must_use]
    pub const fn message(&self) -> Verdict {
        self.message
    }
}

/// Fixed-threshold decision policy.
///
/// # Examples
/// ```
/// use course_match_core::{DecisionPolicy, Verdict};
///
/// let at_threshold = DecisionPolicy.decide(0.65);
/// assert!(!at_threshold.recommended());
/// assert_eq!(at_threshold.message(), Verdict::NotRelevant);
/// assert!(DecisionPolicy.decide(0.66).recommended());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionPolicy;

impl DecisionPolicy {
    /// Threshold applied by [`decide`](Self::decide).
    pub const THRESHOLD: f32 = RECOMMENDATION_THRESHOLD;

    /// Turn a confidence into a [`ScoreResult`].
    #[must_use]
    pub fn decide(self, confidence: f32) -> ScoreResult {
        let recommended = confidence > Self::THRESHOLD;
        let message = if recommended {
            Verdict::Relevant
        } else {
            Verdict::NotRelevant
        };
        ScoreResult {
            confidence,
            recommended,
            message,
        }
    }
}
