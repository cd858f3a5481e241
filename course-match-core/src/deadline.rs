//! Per-call timeouts around a shared scoring engine.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use crate::{EncodedFeatureBundle, ScoringEngine, ScoringError};

/// Runs each score on a worker thread and abandons it after `timeout`.
///
/// An expired deadline is reported as [`ScoringError::InferenceFailure`]; the
/// abandoned computation finishes in the background and its result is
/// discarded. No retry is attempted.
#[derive(Debug)]
pub struct DeadlineScoringEngine<E: ?Sized> {
    inner: Arc<E>,
    timeout: Duration,
}

impl<E: ?Sized> DeadlineScoringEngine<E> {
    /// Wrap a shared engine with a per-call timeout.
    #[must_use]
    pub const fn new(inner: Arc<E>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Timeout applied to every call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<E: ScoringEngine + ?Sized + 'static> ScoringEngine for DeadlineScoringEngine<E> {
    fn score(&self, bundle: &EncodedFeatureBundle) -> Result<f32, ScoringError> {
        let (sender, receiver) = mpsc::sync_channel(1);
        let engine = Arc::clone(&self.inner);
        let owned = bundle.clone();
        thread::Builder::new()
            .name("course-match-score".to_owned())
            .spawn(move || {
                if sender.send(engine.score(&owned)).is_err() {
                    log::debug!("scoring finished after its deadline; result discarded");
                }
            })
            .map_err(|err| ScoringError::inference(format!("failed to start scoring: {err}")))?;

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(ScoringError::inference(format!(
                "scoring exceeded the {:?} deadline",
                self.timeout
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ScoringError::inference(
                "scoring worker stopped without a result",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedScoringEngine, FnScoringEngine};
    use crate::{CategoricalEncoderRegistry, EncoderVocabulary, FeatureAssembler, Field};
    use rstest::{fixture, rstest};
    use std::num::NonZeroUsize;

    #[fixture]
    fn bundle() -> EncodedFeatureBundle {
        let registry = CategoricalEncoderRegistry::new(
            EncoderVocabulary::new(Field::Track, ["T"]).expect("track vocabulary"),
            EncoderVocabulary::new(Field::Subject, ["S"]).expect("subject vocabulary"),
            EncoderVocabulary::new(Field::Course, ["C"]).expect("course vocabulary"),
        )
        .expect("registry");
        let window = NonZeroUsize::new(2).expect("non-zero window");
        FeatureAssembler::new(&registry, window)
            .assemble(1, 0.0, vec![1, 0], 1, 1)
            .expect("bundle")
    }

    #[rstest]
    fn passes_through_prompt_scores(bundle: EncodedFeatureBundle) {
        let engine = DeadlineScoringEngine::new(
            Arc::new(FixedScoringEngine::new(0.8)),
            Duration::from_secs(5),
        );
        assert_eq!(engine.score(&bundle), Ok(0.8));
    }

    #[rstest]
    fn passes_through_engine_errors(bundle: EncodedFeatureBundle) {
        let failing = FnScoringEngine::new(|_| Err(ScoringError::inference("overflow")));
        let engine = DeadlineScoringEngine::new(Arc::new(failing), Duration::from_secs(5));
        assert_eq!(engine.score(&bundle), Err(ScoringError::inference("overflow")));
    }

    #[rstest]
    fn slow_scores_become_inference_failures(bundle: EncodedFeatureBundle) {
        let slow = FnScoringEngine::new(|_| {
            thread::sleep(Duration::from_millis(500));
            Ok(0.9)
        });
        let engine = DeadlineScoringEngine::new(Arc::new(slow), Duration::from_millis(20));
        assert_eq!(engine.timeout(), Duration::from_millis(20));
        let err = engine.score(&bundle).expect_err("deadline should expire");
        assert!(matches!(err, ScoringError::InferenceFailure { .. }));
    }
}
