//! A shared service answers concurrent requests independently and
//! deterministically.

use std::num::NonZeroUsize;
use std::thread;

use course_match_core::{
    AgeNormalizer, CategoricalEncoderRegistry, EncodedFeatureBundle, EncoderVocabulary, Field,
    RecommendationRequest, RecommendationService, ScoringEngine, ScoringError,
};
use rstest::{fixture, rstest};

/// Scores from the target course index so different requests get different
/// answers.
struct IndexEngine;

impl ScoringEngine for IndexEngine {
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        let index = u16::try_from(bundle.target_course_index())
            .map_err(|err| ScoringError::inference(err.to_string()))?;
        Ok(f32::from(index) / 10.0)
    }
}

#[fixture]
fn service() -> RecommendationService<IndexEngine> {
    let registry = CategoricalEncoderRegistry::new(
        EncoderVocabulary::new(Field::Track, ["Sciences SVT"]).expect("track vocabulary"),
        EncoderVocabulary::new(Field::Subject, ["SVT"]).expect("subject vocabulary"),
        EncoderVocabulary::new(
            Field::Course,
            (1..=9).map(|n| format!("Course {n}")),
        )
        .expect("course vocabulary"),
    )
    .expect("registry");
    RecommendationService::new(
        registry,
        NonZeroUsize::new(4).expect("non-zero window"),
        AgeNormalizer::new(17.0, 1.0).expect("scaler"),
        IndexEngine,
    )
}

fn request_for(n: u32) -> RecommendationRequest {
    RecommendationRequest::new("Sciences SVT", 17.0, format!("Course {n}"), "SVT")
        .with_history(["Course 1", "Course 2"])
}

#[rstest]
fn identical_requests_yield_identical_results(service: RecommendationService<IndexEngine>) {
    let request = request_for(7);
    let first = service.predict(&request).expect("first prediction");
    let second = service.predict(&request).expect("second prediction");
    assert_eq!(first, second);
}

#[rstest]
fn concurrent_calls_do_not_interfere(service: RecommendationService<IndexEngine>) {
    let expected: Vec<_> = (1..=9)
        .map(|n| service.predict(&request_for(n)).expect("sequential prediction"))
        .collect();

    let concurrent: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (1..=9)
            .map(|n| {
                let shared = &service;
                scope.spawn(move || shared.predict(&request_for(n)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .expect("worker thread")
                    .expect("concurrent prediction")
            })
            .collect()
    });

    assert_eq!(concurrent, expected);
    assert!(!expected.first().expect("first").result().recommended());
    assert!(expected.last().expect("last").result().recommended());
}
