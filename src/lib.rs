//! Facade crate for the course-match recommendation pipeline.
//!
//! This crate re-exports the core pipeline types and exposes the artefact
//! loader, the two-tower engine and catalogue ranking behind feature flags.

#![forbid(unsafe_code)]

pub use course_match_core::{
    AgeNormalizer, CategoricalEncoderRegistry, DecisionPolicy, EncodedFeatureBundle,
    FeatureAssembler, Field, HistorySequenceEncoder, Prediction, PredictionResponse,
    RECOMMENDATION_THRESHOLD, RecommendationError, RecommendationRequest, RecommendationService,
    ScoreResult, ScoringEngine, ScoringError, UnknownCategory, Verdict,
};

#[cfg(feature = "scorer")]
pub use course_match_scorer::{ArtefactError, ArtefactPaths, TwoTowerScoringEngine, load_service};

#[cfg(feature = "catalog")]
pub use course_match_catalog::{
    AgePolicy, CandidateCourse, CatalogRanker, LabelAliases, LearnerProfile, RankOptions, Ranking,
    rank_candidates,
};

#[cfg(feature = "test-support")]
pub use course_match_core::test_support;
