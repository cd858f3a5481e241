//! Fixed-window encoding of a learner's viewing history.
//!
//! History labels are looked up in the course vocabulary. Unlike the target
//! fields, an unknown history label is not an error: it encodes to
//! [`SENTINEL_INDEX`] so one stale entry cannot block scoring.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::{CategoricalEncoderRegistry, EncoderVocabulary, Field, SENTINEL_INDEX};

/// History window used when the artefact does not specify one.
pub const DEFAULT_HISTORY_WINDOW: NonZeroUsize = NonZeroUsize::MIN.saturating_add(9);

/// Encodes ordered course histories into sequences of exactly `L` indices.
///
/// When the history is longer than the window the oldest entries are dropped;
/// shorter histories are right-padded with the sentinel.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use course_match_core::{
///     CategoricalEncoderRegistry, EncoderVocabulary, Field, HistorySequenceEncoder,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = CategoricalEncoderRegistry::new(
///     EncoderVocabulary::new(Field::Track, ["Sciences SVT"])?,
///     EncoderVocabulary::new(Field::Subject, ["SVT"])?,
///     EncoderVocabulary::new(Field::Course, ["Course A", "Course B"])?,
/// )?;
/// let window = NonZeroUsize::new(4).ok_or("zero window")?;
/// let encoder = HistorySequenceEncoder::from_registry(&registry, window);
/// assert_eq!(encoder.encode_history(&["Course B", "Retired"]), vec![2, 0, 0, 0]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HistorySequenceEncoder {
    courses: Arc<EncoderVocabulary>,
    window: NonZeroUsize,
}

impl HistorySequenceEncoder {
    /// Build an encoder sharing the registry's course vocabulary.
    #[must_use]
    pub fn from_registry(registry: &CategoricalEncoderRegistry, window: NonZeroUsize) -> Self {
        Self {
            courses: registry.shared_vocabulary(Field::Course),
            window,
        }
    }

    /// History window length, `L`.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window.get()
    }

    /// Encode `history` (oldest first) into exactly [`window`](Self::window)
    /// indices.
    #[must_use]
    pub fn encode_history<S: AsRef<str>>(&self, history: &[S]) -> Vec<u32> {
        let window = self.window.get();
        let dropped = history.len().saturating_sub(window);
        let mut encoded: Vec<u32> = history
            .iter()
            .skip(dropped)
            .map(|label| self.encode_entry(label.as_ref()))
            .collect();
        encoded.resize(window, SENTINEL_INDEX);
        encoded
    }

    fn encode_entry(&self, label: &str) -> u32 {
        self.courses.lookup(label).unwrap_or_else(|| {
            log::debug!("history label {label:?} is not in the course vocabulary");
            SENTINEL_INDEX
        })
    }
}
