//! Two-tower model weights as stored in `model.bin`.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use course_match_core::{CategoricalEncoderRegistry, Field};

/// Activation applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// `max(0, x)`.
    Relu,
    /// Identity.
    Linear,
}

/// Which side of the model a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tower {
    /// Learner features: track, age and history.
    Learner,
    /// Course features: target course and subject.
    Course,
}

impl std::fmt::Display for Tower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Learner => "learner",
            Self::Course => "course",
        })
    }
}

/// Lookup table with one row per vocabulary index, row `0` included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Number of rows; the field's vocabulary size plus one.
    pub rows: usize,
    /// Width of each row.
    pub dim: usize,
    /// Row-major values, `rows * dim` long.
    pub values: Vec<f32>,
}

impl Embedding {
    /// Row for `index`, or `None` when it falls outside the table.
    #[must_use]
    pub fn row(&self, index: u32) -> Option<&[f32]> {
        let start = usize::try_from(index).ok()?.checked_mul(self.dim)?;
        let end = start.checked_add(self.dim)?;
        self.values.get(start..end)
    }
}

/// Fully connected layer, `output = activation(weights · input + bias)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Input width.
    pub input: usize,
    /// Output width.
    pub output: usize,
    /// Row-major `output * input` weight matrix.
    pub weights: Vec<f32>,
    /// One bias per output unit.
    pub bias: Vec<f32>,
    /// Activation applied to each output unit.
    pub activation: Activation,
}

/// Every trained parameter of the two-tower model.
///
/// The course embedding is shared by the target course and the history
/// entries. Row `0` of every embedding belongs to the sentinel index and is
/// never averaged into the history representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoTowerWeights {
    /// Track embedding table.
    pub track_embedding: Embedding,
    /// Course embedding table.
    pub course_embedding: Embedding,
    /// Subject embedding table.
    pub subject_embedding: Embedding,
    /// Dense stack applied to the learner features.
    pub learner_layers: Vec<DenseLayer>,
    /// Dense stack applied to the course features.
    pub course_layers: Vec<DenseLayer>,
    /// Bias added to the tower dot product before the sigmoid.
    pub output_bias: f32,
}

/// Shape or value problems found while validating [`TwoTowerWeights`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelShapeError {
    /// An embedding does not have one row per index of its vocabulary.
    #[error("{field} embedding has {found} rows, vocabulary needs {expected}")]
    EmbeddingRows {
        /// Field the embedding encodes.
        field: Field,
        /// Vocabulary size plus one.
        expected: usize,
        /// Rows declared by the artefact.
        found: usize,
    },
    /// An embedding's value buffer does not match `rows * dim`.
    #[error("{field} embedding holds {found} values, shape needs {expected}")]
    EmbeddingValues {
        /// Field the embedding encodes.
        field: Field,
        /// `rows * dim`, saturating at `usize::MAX`.
        expected: usize,
        /// Values present.
        found: usize,
    },
    /// A layer's input width does not match what feeds it.
    #[error("{tower} layer {layer} expects {found} inputs but receives {expected}")]
    LayerInput {
        /// Tower the layer belongs to.
        tower: Tower,
        /// Zero-based layer position.
        layer: usize,
        /// Width produced by the previous stage.
        expected: usize,
        /// Width declared by the layer.
        found: usize,
    },
    /// A layer's weight or bias buffer does not match its declared widths.
    #[error("{tower} layer {layer} holds {found} parameters, shape needs {expected}")]
    LayerParameters {
        /// Tower the layer belongs to.
        tower: Tower,
        /// Zero-based layer position.
        layer: usize,
        /// `output * input + output`, saturating at `usize::MAX`.
        expected: usize,
        /// Parameters present.
        found: usize,
    },
    /// The two towers end in vectors of different widths.
    #[error("learner tower yields {learner} values but course tower yields {course}")]
    TowerMismatch {
        /// Learner representation width.
        learner: usize,
        /// Course representation width.
        course: usize,
    },
    /// A parameter is NaN or infinite.
    #[error("model parameter in {location} is not finite")]
    NonFinite {
        /// Where the bad value was found.
        location: String,
    },
}

impl TwoTowerWeights {
    /// Width of the concatenated learner features.
    #[must_use]
    pub const fn learner_input_width(&self) -> usize {
        self.track_embedding
            .dim
            .saturating_add(1)
            .saturating_add(self.course_embedding.dim)
    }

    /// Width of the concatenated course features.
    #[must_use]
    pub const fn course_input_width(&self) -> usize {
        self.course_embedding
            .dim
            .saturating_add(self.subject_embedding.dim)
    }

    /// Check every shape against `registry` and reject non-finite values.
    ///
    /// # Errors
    /// Returns the first [`ModelShapeError`] found.
    pub fn validate(&self, registry: &CategoricalEncoderRegistry) -> Result<(), ModelShapeError> {
        for (field, embedding) in [
            (Field::Track, &self.track_embedding),
            (Field::Subject, &self.subject_embedding),
            (Field::Course, &self.course_embedding),
        ] {
            check_embedding(field, embedding, registry.size(field))?;
        }
        let learner = check_stack(Tower::Learner, &self.learner_layers, self.learner_input_width())?;
        let course = check_stack(Tower::Course, &self.course_layers, self.course_input_width())?;
        if learner != course {
            return Err(ModelShapeError::TowerMismatch { learner, course });
        }
        if !self.output_bias.is_finite() {
            return Err(ModelShapeError::NonFinite {
                location: "output bias".to_owned(),
            });
        }
        Ok(())
    }
}

fn check_embedding(
    field: Field,
    embedding: &Embedding,
    vocabulary_size: usize,
) -> Result<(), ModelShapeError> {
    let expected_rows = vocabulary_size.saturating_add(1);
    if embedding.rows != expected_rows {
        return Err(ModelShapeError::EmbeddingRows {
            field,
            expected: expected_rows,
            found: embedding.rows,
        });
    }
    let expected = embedding.rows.saturating_mul(embedding.dim);
    if embedding.values.len() != expected {
        return Err(ModelShapeError::EmbeddingValues {
            field,
            expected,
            found: embedding.values.len(),
        });
    }
    ensure_finite(&embedding.values, || format!("{field} embedding"))
}

/// Validate a dense stack fed by `input` values and return its output width.
fn check_stack(
    tower: Tower,
    layers: &[DenseLayer],
    input: usize,
) -> Result<usize, ModelShapeError> {
    layers
        .iter()
        .enumerate()
        .try_fold(input, |width, (position, layer)| {
            if layer.input != width {
                return Err(ModelShapeError::LayerInput {
                    tower,
                    layer: position,
                    expected: width,
                    found: layer.input,
                });
            }
            let expected = layer
                .output
                .saturating_mul(layer.input)
                .saturating_add(layer.output);
            let found = layer.weights.len().saturating_add(layer.bias.len());
            if layer.bias.len() != layer.output || found != expected {
                return Err(ModelShapeError::LayerParameters {
                    tower,
                    layer: position,
                    expected,
                    found,
                });
            }
            ensure_finite(&layer.weights, || format!("{tower} layer {position} weights"))?;
            ensure_finite(&layer.bias, || format!("{tower} layer {position} bias"))?;
            Ok(layer.output)
        })
}

fn ensure_finite(
    values: &[f32],
    location: impl FnOnce() -> String,
) -> Result<(), ModelShapeError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ModelShapeError::NonFinite {
            location: location(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{registry, weights};
    use rstest::rstest;

    #[rstest]
    fn fixture_weights_are_valid(registry: CategoricalEncoderRegistry) {
        assert_eq!(weights().validate(&registry), Ok(()));
    }

    #[rstest]
    fn embedding_rows_must_cover_the_vocabulary(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        model.course_embedding.rows = 3;
        assert_eq!(
            model.validate(&registry),
            Err(ModelShapeError::EmbeddingRows {
                field: Field::Course,
                expected: 4,
                found: 3,
            })
        );
    }

    #[rstest]
    fn embedding_values_must_match_shape(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        model.track_embedding.values.pop();
        assert!(matches!(
            model.validate(&registry),
            Err(ModelShapeError::EmbeddingValues {
                field: Field::Track,
                ..
            })
        ));
    }

    #[rstest]
    fn layer_inputs_must_chain(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        if let Some(layer) = model.learner_layers.first_mut() {
            layer.input = 4;
        }
        assert!(matches!(
            model.validate(&registry),
            Err(ModelShapeError::LayerInput {
                tower: Tower::Learner,
                layer: 0,
                expected: 5,
                found: 4,
            })
        ));
    }

    #[rstest]
    fn towers_must_agree_on_width(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        model.course_layers.clear();
        assert_eq!(
            model.validate(&registry),
            Err(ModelShapeError::TowerMismatch {
                learner: 2,
                course: 4,
            })
        );
    }

    #[rstest]
    fn non_finite_parameters_are_rejected(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        if let Some(value) = model.subject_embedding.values.first_mut() {
            *value = f32::NAN;
        }
        assert!(matches!(
            model.validate(&registry),
            Err(ModelShapeError::NonFinite { .. })
        ));
    }

    #[rstest]
    #[case(0, Some(&[0.0_f32, 0.0][..]))]
    #[case(2, Some(&[0.0_f32, 1.0][..]))]
    #[case(3, None)]
    fn embedding_rows_are_bounds_checked(#[case] index: u32, #[case] expected: Option<&[f32]>) {
        assert_eq!(weights().track_embedding.row(index), expected);
    }
}
