//! Feature encoding and decision pipeline for course recommendations.
//!
//! A request carries free-form labels: the learner's track, age and viewed
//! courses plus a target course and its subject. The pipeline turns those
//! into the integer and scalar inputs a pre-trained model expects, asks a
//! [`ScoringEngine`] for a confidence, and applies a fixed threshold:
//!
//! - [`CategoricalEncoderRegistry`] maps target labels to 1-based indices and
//!   rejects anything it has not seen.
//! - [`HistorySequenceEncoder`] keeps the most recent `L` viewed courses and
//!   pads with the sentinel `0`; unknown history entries are tolerated.
//! - [`AgeNormalizer`] applies the stored standard scaler.
//! - [`FeatureAssembler`] checks every index before producing an
//!   [`EncodedFeatureBundle`].
//! - [`DecisionPolicy`] recommends a course when its confidence strictly
//!   exceeds [`RECOMMENDATION_THRESHOLD`].
//!
//! [`RecommendationService`] composes these parts and is safe to share
//! between threads once built.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod age;
mod deadline;
mod decision;
mod engine;
mod features;
mod field;
mod history;
mod registry;
mod request;
mod service;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
mod vocabulary;

pub use age::{AgeNormalizer, AgeScalerError};
pub use deadline::DeadlineScoringEngine;
pub use decision::{DecisionPolicy, RECOMMENDATION_THRESHOLD, ScoreResult, Verdict};
pub use engine::{ScoringEngine, ScoringError};
pub use features::{EncodedFeatureBundle, FeatureAssembler, FeatureInput, InvalidFeatureBundle, slot};
pub use field::Field;
pub use history::{DEFAULT_HISTORY_WINDOW, HistorySequenceEncoder};
pub use registry::{CategoricalEncoderRegistry, UnknownCategory};
pub use request::RecommendationRequest;
pub use service::{
    ErrorPayload, Prediction, PredictionResponse, RecommendationError, RecommendationService,
};
pub use vocabulary::{EncoderVocabulary, SENTINEL_INDEX, VocabularyError};
