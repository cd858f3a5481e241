//! Request orchestration: encode, assemble, score, decide.
//!
//! [`RecommendationService`] is built once at startup from immutable parts
//! and shared by reference between request handlers. Each call to
//! [`predict`](RecommendationService::predict) is independent; nothing is
//! written back to the service.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::{
    AgeNormalizer, CategoricalEncoderRegistry, DecisionPolicy, EncodedFeatureBundle,
    FeatureAssembler, Field, HistorySequenceEncoder, InvalidFeatureBundle, RecommendationRequest,
    ScoreResult, ScoringEngine, ScoringError, UnknownCategory, Verdict,
};

/// Errors returned by [`RecommendationService::predict`].
///
/// Unknown categories are client-correctable; inference failures may be
/// retried by the caller; the remaining kinds are internal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendationError {
    /// A target field referenced a label outside its vocabulary.
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    /// The pipeline produced a bundle violating its own invariants.
    #[error("internal pipeline error: {0}")]
    InvalidFeatureBundle(#[from] InvalidFeatureBundle),
    /// The scoring model is not loaded.
    #[error("scoring model unavailable: {reason}")]
    ModelUnavailable {
        /// Why the model could not be loaded.
        reason: String,
    },
    /// Scoring failed for an otherwise valid request.
    #[error("inference failed: {cause}")]
    InferenceFailure {
        /// Description of the underlying failure.
        cause: String,
    },
}

impl From<ScoringError> for RecommendationError {
    fn from(error: ScoringError) -> Self {
        match error {
            ScoringError::ModelUnavailable { reason } => Self::ModelUnavailable { reason },
            ScoringError::InferenceFailure { cause } => Self::InferenceFailure { cause },
        }
    }
}

impl RecommendationError {
    /// Stable machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCategory(_) => "unknown_category",
            Self::InvalidFeatureBundle(_) => "invalid_feature_bundle",
            Self::ModelUnavailable { .. } => "model_unavailable",
            Self::InferenceFailure { .. } => "inference_failure",
        }
    }

    /// Whether the caller can fix the request and resubmit.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownCategory(_))
    }

    /// Serialisable error body.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        let (field, known_values) = match self {
            Self::UnknownCategory(unknown) => (Some(unknown.field), Some(unknown.known.clone())),
            Self::InvalidFeatureBundle(_)
            | Self::ModelUnavailable { .. }
            | Self::InferenceFailure { .. } => (None, None),
        };
        ErrorPayload {
            kind: self.kind(),
            detail: self.to_string(),
            field,
            known_values,
        }
    }
}

/// Wire form of a [`RecommendationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorPayload {
    /// Stable error kind.
    pub kind: &'static str,
    /// Human-readable description.
    pub detail: String,
    /// Field that rejected the input, for unknown categories.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub field: Option<Field>,
    /// Accepted labels, for unknown categories.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub known_values: Option<Vec<String>>,
}

/// Score result echoed with the target course it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    target_course: String,
    result: ScoreResult,
}

impl Prediction {
    /// Target course name from the request.
    #[must_use]
    pub fn target_course(&self) -> &str {
        &self.target_course
    }

    /// Decision over the model score.
    #[must_use]
    pub const fn result(&self) -> &ScoreResult {
        &self.result
    }

    /// Display form with the confidence rounded to four decimals.
    ///
    /// `recommandation` and `message` come from the unrounded score, so a
    /// confidence of `0.65002` displays as `0.65` and is still recommended.
    #[must_use]
    pub fn response(&self) -> PredictionResponse {
        PredictionResponse {
            target_course: self.target_course.clone(),
            score_confidence: round_for_display(self.result.confidence()),
            recommandation: self.result.recommended(),
            message: self.result.message(),
        }
    }
}

/// Wire form of a [`Prediction`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionResponse {
    /// Target course name from the request.
    pub target_course: String,
    /// Confidence rounded to four decimals.
    pub score_confidence: f64,
    /// Whether the course is recommended.
    pub recommandation: bool,
    /// Verdict string.
    pub message: Verdict,
}

#[expect(
    clippy::float_arithmetic,
    reason = "display rounding scales to four decimals and back"
)]
fn round_for_display(confidence: f32) -> f64 {
    (f64::from(confidence) * 10_000.0).round() / 10_000.0
}

/// Orchestrates the encoding pipeline around a [`ScoringEngine`].
///
/// # Examples
/// ```
/// use course_match_core::{
///     AgeNormalizer, CategoricalEncoderRegistry, DEFAULT_HISTORY_WINDOW, EncodedFeatureBundle,
///     EncoderVocabulary, Field, RecommendationRequest, RecommendationService, ScoringEngine,
///     ScoringError,
/// };
///
/// struct Constant;
///
/// impl ScoringEngine for Constant {
///     fn score(&self, _bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
///         Ok(0.8)
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = CategoricalEncoderRegistry::new(
///     EncoderVocabulary::new(Field::Track, ["Sciences SVT"])?,
///     EncoderVocabulary::new(Field::Subject, ["SVT"])?,
///     EncoderVocabulary::new(Field::Course, ["Course A", "Course B"])?,
/// )?;
/// let service = RecommendationService::new(
///     registry,
///     DEFAULT_HISTORY_WINDOW,
///     AgeNormalizer::new(17.0, 1.5)?,
///     Constant,
/// );
/// let request = RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT")
///     .with_history(["Course A"]);
/// let prediction = service.predict(&request)?;
/// assert!(prediction.result().recommended());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RecommendationService<E> {
    registry: CategoricalEncoderRegistry,
    history: HistorySequenceEncoder,
    age: AgeNormalizer,
    assembler: FeatureAssembler,
    policy: DecisionPolicy,
    engine: E,
}

impl<E: ScoringEngine> RecommendationService<E> {
    /// Compose a service from loaded artefacts and an engine.
    #[must_use]
    pub fn new(
        registry: CategoricalEncoderRegistry,
        history_window: NonZeroUsize,
        age: AgeNormalizer,
        engine: E,
    ) -> Self {
        let history = HistorySequenceEncoder::from_registry(&registry, history_window);
        let assembler = FeatureAssembler::new(&registry, history_window);
        Self {
            registry,
            history,
            age,
            assembler,
            policy: DecisionPolicy,
            engine,
        }
    }

    /// Vocabularies backing the service.
    #[must_use]
    pub const fn registry(&self) -> &CategoricalEncoderRegistry {
        &self.registry
    }

    /// History window length, `L`.
    #[must_use]
    pub const fn history_window(&self) -> usize {
        self.history.window()
    }

    /// Age normaliser backing the service.
    #[must_use]
    pub const fn age_normalizer(&self) -> &AgeNormalizer {
        &self.age
    }

    /// Scoring engine backing the service.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Run the encoding half of the pipeline without scoring.
    ///
    /// # Errors
    /// Returns [`RecommendationError::UnknownCategory`] for an unknown track,
    /// subject or target course, and
    /// [`RecommendationError::InvalidFeatureBundle`] when assembly detects
    /// an internal inconsistency.
    pub fn encode(
        &self,
        request: &RecommendationRequest,
    ) -> Result<EncodedFeatureBundle, RecommendationError> {
        let track = self
            .registry
            .encode(Field::Track, &request.learner_track)?;
        let subject = self
            .registry
            .encode(Field::Subject, &request.target_subject)?;
        let course = self
            .registry
            .encode(Field::Course, &request.target_course_name)?;
        let history = self.history.encode_history(request.learner_history.as_slice());
        let age = self.age.normalize(request.learner_age);

        self.assembler
            .assemble(track, age, history, course, subject)
            .map_err(|err| {
                log::error!(
                    "feature assembly failed for {:?}: {err}",
                    request.target_course_name
                );
                RecommendationError::InvalidFeatureBundle(err)
            })
    }

    /// Score `request` and apply the decision policy.
    ///
    /// # Errors
    /// Propagates [`encode`](Self::encode) failures, returns
    /// [`RecommendationError::ModelUnavailable`] and
    /// [`RecommendationError::InferenceFailure`] from the engine unchanged,
    /// and reports a non-finite or out-of-range score as an inference
    /// failure.
    pub fn predict(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Prediction, RecommendationError> {
        let bundle = self.encode(request)?;
        let confidence = self.engine.score(&bundle)?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(RecommendationError::InferenceFailure {
                cause: format!("model returned {confidence}, outside 0..=1"),
            });
        }
        log::debug!(
            "scored {:?} for track {:?}: {confidence:.4}",
            request.target_course_name,
            request.learner_track
        );
        Ok(Prediction {
            target_course: request.target_course_name.clone(),
            result: self.policy.decide(confidence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedScoringEngine, FnScoringEngine, UnavailableScoringEngine};
    use crate::EncoderVocabulary;
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    #[fixture]
    fn registry() -> CategoricalEncoderRegistry {
        CategoricalEncoderRegistry::new(
            EncoderVocabulary::new(Field::Track, ["Sciences Maths (SM)", "Sciences SVT"])
                .expect("track vocabulary"),
            EncoderVocabulary::new(Field::Subject, ["Anglais", "SVT"]).expect("subject vocabulary"),
            EncoderVocabulary::new(Field::Course, ["Course A", "Course B", "Course C"])
                .expect("course vocabulary"),
        )
        .expect("registry")
    }

    fn service_with<E: ScoringEngine>(
        registry: CategoricalEncoderRegistry,
        engine: E,
    ) -> RecommendationService<E> {
        RecommendationService::new(
            registry,
            NonZeroUsize::new(3).expect("non-zero window"),
            AgeNormalizer::new(17.0, 2.0).expect("finite scaler"),
            engine,
        )
    }

    fn request() -> RecommendationRequest {
        RecommendationRequest::new("Sciences SVT", 19.0, "Course B", "SVT")
            .with_history(["Course A", "Unknown course"])
    }

    #[rstest]
    fn encode_builds_bundle_from_request(registry: CategoricalEncoderRegistry) {
        let service = service_with(registry, FixedScoringEngine::new(0.5));
        let bundle = service.encode(&request()).expect("bundle");
        assert_eq!(bundle.track_index(), 2);
        assert_eq!(bundle.target_subject_index(), 2);
        assert_eq!(bundle.target_course_index(), 2);
        assert_eq!(bundle.history_indices(), &[1, 0, 0]);
        assert!((bundle.normalized_age() - 1.0).abs() < f32::EPSILON);
    }

    #[rstest]
    #[case(0.8, true)]
    #[case(0.65, false)]
    #[case(0.3, false)]
    fn predict_applies_threshold(
        registry: CategoricalEncoderRegistry,
        #[case] score: f32,
        #[case] expected: bool,
    ) {
        let service = service_with(registry, FixedScoringEngine::new(score));
        let prediction = service.predict(&request()).expect("prediction");
        assert_eq!(prediction.target_course(), "Course B");
        assert_eq!(prediction.result().recommended(), expected);
        assert_eq!(prediction.result().confidence(), score);
    }

    #[rstest]
    #[case(RecommendationRequest::new("Lettres", 17.0, "Course B", "SVT"), Field::Track)]
    #[case(RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "Chimie"), Field::Subject)]
    #[case(RecommendationRequest::new("Sciences SVT", 17.0, "Course Z", "SVT"), Field::Course)]
    fn unknown_targets_never_reach_the_engine(
        registry: CategoricalEncoderRegistry,
        #[case] request: RecommendationRequest,
        #[case] field: Field,
    ) {
        let calls = Mutex::new(0_u32);
        let engine = FnScoringEngine::new(|_| {
            *calls.lock().expect("call counter") += 1;
            Ok(0.9)
        });
        let service = service_with(registry, engine);
        let err = service.predict(&request).expect_err("unknown label");
        let RecommendationError::UnknownCategory(unknown) = &err else {
            panic!("expected unknown category, got {err:?}");
        };
        assert_eq!(unknown.field, field);
        assert!(err.is_client_error());
        assert_eq!(*calls.lock().expect("call counter"), 0);
    }

    #[rstest]
    fn unknown_history_is_not_an_error(registry: CategoricalEncoderRegistry) {
        let service = service_with(registry, FixedScoringEngine::new(0.7));
        let request = request().with_history(["Nope", "Also nope"]);
        assert!(service.predict(&request).is_ok());
    }

    #[rstest]
    fn engine_errors_map_to_matching_kinds(registry: CategoricalEncoderRegistry) {
        let unavailable = service_with(registry.clone(), UnavailableScoringEngine::default());
        let err = unavailable.predict(&request()).expect_err("no model");
        assert_eq!(err.kind(), "model_unavailable");
        assert!(!err.is_client_error());

        let missing = service_with(
            registry.clone(),
            UnavailableScoringEngine::with_reason("model.bin not found"),
        );
        let err = missing.predict(&request()).expect_err("no model");
        assert!(err.payload().detail.contains("model.bin not found"));

        let failing = service_with(
            registry,
            FnScoringEngine::new(|_| Err(ScoringError::inference("nan in layer 2"))),
        );
        let err = failing.predict(&request()).expect_err("inference failure");
        assert_eq!(err.kind(), "inference_failure");
    }

    #[rstest]
    #[case(f32::NAN)]
    #[case(1.5)]
    #[case(-0.1)]
    fn out_of_range_scores_are_inference_failures(
        registry: CategoricalEncoderRegistry,
        #[case] score: f32,
    ) {
        let service = service_with(registry, FixedScoringEngine::new(score));
        let err = service.predict(&request()).expect_err("bad score");
        assert!(matches!(err, RecommendationError::InferenceFailure { .. }));
    }

    #[rstest]
    fn response_rounds_confidence(registry: CategoricalEncoderRegistry) {
        let service = service_with(registry, FixedScoringEngine::new(0.812_345));
        let response = service.predict(&request()).expect("prediction").response();
        assert!((response.score_confidence - 0.8123).abs() < 1e-9);
        assert!(response.recommandation);
        assert_eq!(response.message, Verdict::Relevant);
        assert_eq!(response.target_course, "Course B");
    }

    #[rstest]
    #[case(0.650_02, 0.65, true, Verdict::Relevant)]
    #[case(0.649_98, 0.65, false, Verdict::NotRelevant)]
    fn verdict_follows_the_unrounded_score(
        registry: CategoricalEncoderRegistry,
        #[case] score: f32,
        #[case] displayed: f64,
        #[case] recommended: bool,
        #[case] verdict: Verdict,
    ) {
        let service = service_with(registry, FixedScoringEngine::new(score));
        let response = service.predict(&request()).expect("prediction").response();
        assert!((response.score_confidence - displayed).abs() < 1e-9);
        assert_eq!(response.recommandation, recommended);
        assert_eq!(response.message, verdict);
    }

    #[rstest]
    fn exposes_the_configured_normaliser(registry: CategoricalEncoderRegistry) {
        let service = service_with(registry, FixedScoringEngine::new(0.5));
        assert!((service.age_normalizer().mean() - 17.0).abs() < f64::EPSILON);
        assert!((service.age_normalizer().scale() - 2.0).abs() < f64::EPSILON);
        assert_eq!(service.history_window(), 3);
    }

    #[rstest]
    fn payload_lists_known_values_for_unknown_categories(registry: CategoricalEncoderRegistry) {
        let service = service_with(registry, FixedScoringEngine::new(0.5));
        let request = RecommendationRequest::new("Sciences SVT", 17.0, "Course Z", "SVT");
        let payload = service.predict(&request).expect_err("unknown course").payload();
        assert_eq!(payload.kind, "unknown_category");
        assert_eq!(payload.field, Some(Field::Course));
        assert_eq!(
            payload.known_values,
            Some(vec![
                "Course A".to_owned(),
                "Course B".to_owned(),
                "Course C".to_owned()
            ])
        );
    }

    #[rstest]
    fn payload_omits_known_values_for_internal_errors() {
        let payload = RecommendationError::ModelUnavailable {
            reason: "missing model.bin".to_owned(),
        }
        .payload();
        assert_eq!(payload.field, None);
        assert_eq!(payload.known_values, None);
        assert!(payload.detail.contains("missing model.bin"));
    }
}
