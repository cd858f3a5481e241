//! Small vocabularies and hand-checkable weights shared by unit tests.

use course_match_core::{CategoricalEncoderRegistry, EncoderVocabulary, Field};
use rstest::fixture;

use crate::model::{Activation, DenseLayer, Embedding, TwoTowerWeights};

#[fixture]
pub(crate) fn registry() -> CategoricalEncoderRegistry {
    CategoricalEncoderRegistry::new(
        EncoderVocabulary::new(Field::Track, ["Sciences Maths (SM)", "Sciences SVT"])
            .expect("track vocabulary"),
        EncoderVocabulary::new(Field::Subject, ["Mathematiques", "SVT"])
            .expect("subject vocabulary"),
        EncoderVocabulary::new(Field::Course, ["Course A", "Course B", "Course C"])
            .expect("course vocabulary"),
    )
    .expect("registry")
}

/// Identity-like towers: the learner vector is `track + mean(history)` and
/// the course vector is `course + subject`, both two wide.
pub(crate) fn weights() -> TwoTowerWeights {
    TwoTowerWeights {
        track_embedding: Embedding {
            rows: 3,
            dim: 2,
            values: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        },
        course_embedding: Embedding {
            rows: 4,
            dim: 2,
            values: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        },
        subject_embedding: Embedding {
            rows: 3,
            dim: 2,
            values: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        },
        learner_layers: vec![DenseLayer {
            input: 5,
            output: 2,
            weights: vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            bias: vec![0.0, 0.0],
            activation: Activation::Linear,
        }],
        course_layers: vec![DenseLayer {
            input: 4,
            output: 2,
            weights: vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
            bias: vec![0.0, 0.0],
            activation: Activation::Linear,
        }],
        output_bias: 0.0,
    }
}
