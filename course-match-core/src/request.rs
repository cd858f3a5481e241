//! Raw, loosely-typed scoring requests.

/// One learner/course pair to score.
///
/// Every string is a free-form label from an upstream caller; none is
/// guaranteed to exist in the trained vocabularies. Field aliases accept the
/// payload keys used by earlier clients (`user_filliere`, `target_matiere`
/// and friends).
///
/// # Examples
/// ```
/// use course_match_core::RecommendationRequest;
///
/// let request = RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT")
///     .with_history(["Course A"]);
/// assert_eq!(request.learner_history, vec!["Course A".to_owned()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecommendationRequest {
    /// Learner track label.
    #[cfg_attr(feature = "serde", serde(alias = "user_filliere"))]
    pub learner_track: String,
    /// Learner age in years, already defaulted by the caller.
    #[cfg_attr(feature = "serde", serde(alias = "user_age"))]
    pub learner_age: f64,
    /// Viewed course names, chronological, most recent last.
    #[cfg_attr(feature = "serde", serde(default, alias = "user_history_names"))]
    pub learner_history: Vec<String>,
    /// Course being considered.
    pub target_course_name: String,
    /// Subject of the course being considered.
    #[cfg_attr(feature = "serde", serde(alias = "target_matiere"))]
    pub target_subject: String,
}

impl RecommendationRequest {
    /// Build a request with an empty history.
    pub fn new(
        learner_track: impl Into<String>,
        learner_age: f64,
        target_course_name: impl Into<String>,
        target_subject: impl Into<String>,
    ) -> Self {
        Self {
            learner_track: learner_track.into(),
            learner_age,
            learner_history: Vec::new(),
            target_course_name: target_course_name.into(),
            target_subject: target_subject.into(),
        }
    }

    /// Replace the viewing history.
    #[must_use]
    pub fn with_history<I, S>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.learner_history = history.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn deserialises_current_field_names() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{
                "learner_track": "Sciences SVT",
                "learner_age": 17,
                "learner_history": ["Course A"],
                "target_course_name": "Course B",
                "target_subject": "SVT"
            }"#,
        )
        .expect("valid request");
        assert_eq!(
            request,
            RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT")
                .with_history(["Course A"])
        );
    }

    #[rstest]
    fn accepts_legacy_aliases_and_missing_history() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{
                "user_filliere": "Sciences SVT",
                "user_age": 20.5,
                "target_course_name": "Youth and Humour",
                "target_matiere": "Anglais"
            }"#,
        )
        .expect("legacy request");
        assert_eq!(request.learner_track, "Sciences SVT");
        assert!((request.learner_age - 20.5).abs() < f64::EPSILON);
        assert!(request.learner_history.is_empty());
        assert_eq!(request.target_subject, "Anglais");
    }

    #[rstest]
    fn rejects_non_numeric_age() {
        let result = serde_json::from_str::<RecommendationRequest>(
            r#"{
                "learner_track": "Sciences SVT",
                "learner_age": "seventeen",
                "target_course_name": "Course B",
                "target_subject": "SVT"
            }"#,
        );
        assert!(result.is_err());
    }
}
