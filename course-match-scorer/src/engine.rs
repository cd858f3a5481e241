//! Request-time scoring with validated two-tower weights.
#![forbid(unsafe_code)]

use course_match_core::{
    CategoricalEncoderRegistry, EncodedFeatureBundle, SENTINEL_INDEX, ScoringEngine, ScoringError,
};

use crate::model::{Activation, DenseLayer, Embedding, ModelShapeError, TwoTowerWeights};

/// Scores bundles with a two-tower network.
///
/// The learner tower sees the track embedding, the normalised age and the
/// mean embedding of the non-sentinel history entries. The course tower sees
/// the target course and subject embeddings. The confidence is
/// `sigmoid(learner · course + output_bias)`.
///
/// Weights are checked against the vocabularies once, in
/// [`new`](Self::new); scoring never re-validates shapes.
#[derive(Debug, Clone)]
pub struct TwoTowerScoringEngine {
    weights: TwoTowerWeights,
}

impl TwoTowerScoringEngine {
    /// Validate `weights` against `registry` and wrap them.
    ///
    /// # Errors
    /// Returns [`ModelShapeError`] when any shape disagrees with the
    /// vocabularies or a parameter is not finite.
    pub fn new(
        weights: TwoTowerWeights,
        registry: &CategoricalEncoderRegistry,
    ) -> Result<Self, ModelShapeError> {
        weights.validate(registry)?;
        Ok(Self { weights })
    }

    /// Validated weights.
    #[must_use]
    pub const fn weights(&self) -> &TwoTowerWeights {
        &self.weights
    }

    fn learner_vector(&self, bundle: &EncodedFeatureBundle) -> Result<Vec<f32>, ScoringError> {
        let track = embed(&self.weights.track_embedding, bundle.track_index(), "track")?;
        let history = mean_history(&self.weights.course_embedding, bundle.history_indices())?;
        let mut features = Vec::with_capacity(self.weights.learner_input_width());
        features.extend_from_slice(track);
        features.push(bundle.normalized_age());
        features.extend(history);
        run_stack(&self.weights.learner_layers, features)
    }

    fn course_vector(&self, bundle: &EncodedFeatureBundle) -> Result<Vec<f32>, ScoringError> {
        let course = embed(
            &self.weights.course_embedding,
            bundle.target_course_index(),
            "course",
        )?;
        let subject = embed(
            &self.weights.subject_embedding,
            bundle.target_subject_index(),
            "subject",
        )?;
        let mut features = Vec::with_capacity(self.weights.course_input_width());
        features.extend_from_slice(course);
        features.extend_from_slice(subject);
        run_stack(&self.weights.course_layers, features)
    }
}

impl ScoringEngine for TwoTowerScoringEngine {
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        let learner = self.learner_vector(bundle)?;
        let course = self.course_vector(bundle)?;
        let logit = output_logit(&learner, &course, self.weights.output_bias);
        let confidence = sigmoid(logit);
        if confidence.is_finite() {
            Ok(confidence)
        } else {
            Err(ScoringError::inference(format!(
                "model output is not finite (logit {logit})"
            )))
        }
    }
}

fn embed<'a>(table: &'a Embedding, index: u32, slot: &str) -> Result<&'a [f32], ScoringError> {
    table
        .row(index)
        .ok_or_else(|| ScoringError::inference(format!("{slot} index {index} has no embedding row")))
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "averaging embeddings divides by a count bounded by the history window"
)]
fn mean_history(table: &Embedding, history: &[u32]) -> Result<Vec<f32>, ScoringError> {
    let mut sum = vec![0.0_f32; table.dim];
    let mut count = 0_usize;
    for &index in history.iter().filter(|&&index| index != SENTINEL_INDEX) {
        let row = embed(table, index, "history")?;
        for (acc, value) in sum.iter_mut().zip(row) {
            *acc += value;
        }
        count = count.saturating_add(1);
    }
    if count > 0 {
        let divisor = count as f32;
        for acc in &mut sum {
            *acc /= divisor;
        }
    }
    Ok(sum)
}

fn run_stack(layers: &[DenseLayer], input: Vec<f32>) -> Result<Vec<f32>, ScoringError> {
    let output = layers
        .iter()
        .fold(input, |features, layer| apply_layer(layer, &features));
    if output.iter().all(|value| value.is_finite()) {
        Ok(output)
    } else {
        Err(ScoringError::inference("tower activation is not finite"))
    }
}

fn apply_layer(layer: &DenseLayer, input: &[f32]) -> Vec<f32> {
    layer
        .weights
        .chunks_exact(layer.input.max(1))
        .zip(&layer.bias)
        .map(|(row, bias)| {
            let sum = row
                .iter()
                .zip(input)
                .fold(*bias, |acc, (weight, value)| weight.mul_add(*value, acc));
            match layer.activation {
                Activation::Relu => sum.max(0.0),
                Activation::Linear => sum,
            }
        })
        .collect()
}

fn output_logit(learner: &[f32], course: &[f32], bias: f32) -> f32 {
    learner
        .iter()
        .zip(course)
        .fold(bias, |acc, (left, right)| left.mul_add(*right, acc))
}

#[expect(clippy::float_arithmetic, reason = "logistic function")]
fn sigmoid(logit: f32) -> f32 {
    1.0 / (1.0 + (-logit).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{registry, weights};
    use course_match_core::{
        AgeNormalizer, DEFAULT_HISTORY_WINDOW, RecommendationRequest, RecommendationService,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn service(
        registry: CategoricalEncoderRegistry,
    ) -> RecommendationService<TwoTowerScoringEngine> {
        let engine = TwoTowerScoringEngine::new(weights(), &registry).expect("valid weights");
        RecommendationService::new(
            registry,
            DEFAULT_HISTORY_WINDOW,
            AgeNormalizer::new(17.0, 1.0).expect("scaler"),
            engine,
        )
    }

    fn score(
        service: &RecommendationService<TwoTowerScoringEngine>,
        request: &RecommendationRequest,
    ) -> f32 {
        service
            .predict(request)
            .expect("prediction")
            .result()
            .confidence()
    }

    #[rstest]
    fn matching_learner_scores_sigmoid_of_tower_dot_product(
        service: RecommendationService<TwoTowerScoringEngine>,
    ) {
        // learner = [0, 1] + mean([1, 0]) = [1, 1]; course = [0, 1] + [0, 1] = [0, 2]
        let request = RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT")
            .with_history(["Course A"]);
        let expected = 1.0 / (1.0 + (-2.0_f32).exp());
        assert!((score(&service, &request) - expected).abs() < 1e-6);
    }

    #[rstest]
    fn orthogonal_towers_score_one_half(service: RecommendationService<TwoTowerScoringEngine>) {
        let request = RecommendationRequest::new("Sciences Maths (SM)", 17.0, "Course B", "SVT");
        assert!((score(&service, &request) - 0.5).abs() < 1e-6);
    }

    #[rstest]
    fn sentinel_history_entries_are_excluded_from_the_mean(
        service: RecommendationService<TwoTowerScoringEngine>,
    ) {
        let with_unknown = RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT")
            .with_history(["Course A", "Retired", "Gone"]);
        let clean = RecommendationRequest::new("Sciences SVT", 17.0, "Course B", "SVT")
            .with_history(["Course A"]);
        assert_eq!(score(&service, &with_unknown), score(&service, &clean));
    }

    #[rstest]
    fn scoring_is_deterministic(service: RecommendationService<TwoTowerScoringEngine>) {
        let request = RecommendationRequest::new("Sciences SVT", 18.5, "Course C", "Mathematiques")
            .with_history(["Course B", "Course C"]);
        let first = score(&service, &request);
        assert!((0.0..=1.0).contains(&first));
        assert_eq!(first, score(&service, &request));
    }

    #[rstest]
    fn relu_clamps_negative_activations() {
        let layer = DenseLayer {
            input: 2,
            output: 2,
            weights: vec![1.0, 0.0, 0.0, -1.0],
            bias: vec![0.0, 0.0],
            activation: Activation::Relu,
        };
        assert_eq!(apply_layer(&layer, &[3.0, 2.0]), vec![3.0, 0.0]);
    }

    #[rstest]
    fn mismatched_weights_are_refused(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        model.subject_embedding.rows = 5;
        assert!(TwoTowerScoringEngine::new(model, &registry).is_err());
    }

    #[rstest]
    fn overflowing_logits_are_inference_failures(registry: CategoricalEncoderRegistry) {
        let mut model = weights();
        model.output_bias = f32::MAX;
        if let Some(layer) = model.course_layers.first_mut() {
            layer.weights.iter_mut().for_each(|weight| *weight = f32::MAX);
        }
        let engine = TwoTowerScoringEngine::new(model, &registry).expect("finite weights");
        let service = RecommendationService::new(
            registry,
            DEFAULT_HISTORY_WINDOW,
            AgeNormalizer::new(17.0, 1.0).expect("scaler"),
            engine,
        );
        let request = RecommendationRequest::new("Sciences SVT", 17.0, "Course C", "SVT");
        let err = service.predict(&request).expect_err("overflow");
        assert_eq!(err.kind(), "inference_failure");
    }
}
