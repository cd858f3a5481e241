//! Strict label encoding for the target-side categorical fields.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::{EncoderVocabulary, Field, VocabularyError};

/// A label was not part of the trained vocabulary for its field.
///
/// Carries the full set of valid labels so callers can report what would
/// have been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {field} label {value:?} ({} known labels)", .known.len())]
pub struct UnknownCategory {
    /// Field the label was submitted for.
    pub field: Field,
    /// Rejected label.
    pub value: String,
    /// Labels the field accepts, sorted.
    pub known: Vec<String>,
}

/// Holds the track, subject and course vocabularies loaded from the artefact.
///
/// The registry is immutable once built and is `Send + Sync`, so a single
/// instance can serve lookups from any number of threads.
///
/// # Examples
/// ```
/// use course_match_core::{CategoricalEncoderRegistry, EncoderVocabulary, Field};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = CategoricalEncoderRegistry::new(
///     EncoderVocabulary::new(Field::Track, ["Sciences SVT"])?,
///     EncoderVocabulary::new(Field::Subject, ["SVT"])?,
///     EncoderVocabulary::new(Field::Course, ["Course A", "Course B"])?,
/// )?;
/// assert_eq!(registry.encode(Field::Course, "Course B")?, 2);
/// assert!(registry.encode(Field::Course, "Course Z").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CategoricalEncoderRegistry {
    track: Arc<EncoderVocabulary>,
    subject: Arc<EncoderVocabulary>,
    course: Arc<EncoderVocabulary>,
}

impl CategoricalEncoderRegistry {
    /// Assemble a registry from one vocabulary per field.
    ///
    /// # Errors
    /// Returns [`VocabularyError::FieldMismatch`] when a vocabulary was built
    /// for a different field than the slot it is passed in.
    pub fn new(
        track: EncoderVocabulary,
        subject: EncoderVocabulary,
        course: EncoderVocabulary,
    ) -> Result<Self, VocabularyError> {
        for (expected, vocabulary) in [
            (Field::Track, &track),
            (Field::Subject, &subject),
            (Field::Course, &course),
        ] {
            if vocabulary.field() != expected {
                return Err(VocabularyError::FieldMismatch {
                    expected,
                    found: vocabulary.field(),
                });
            }
        }
        Ok(Self {
            track: Arc::new(track),
            subject: Arc::new(subject),
            course: Arc::new(course),
        })
    }

    /// Encode `label` for `field`.
    ///
    /// # Errors
    /// Returns [`UnknownCategory`] when the label is absent. The registry
    /// never substitutes a default.
    pub fn encode(&self, field: Field, label: &str) -> Result<u32, UnknownCategory> {
        self.vocabulary(field)
            .lookup(label)
            .ok_or_else(|| UnknownCategory {
                field,
                value: label.to_owned(),
                known: self.known_labels(field).into_iter().map(str::to_owned).collect(),
            })
    }

    /// Known labels for `field`, sorted for stable diagnostics.
    #[must_use]
    pub fn known_labels(&self, field: Field) -> BTreeSet<&str> {
        self.vocabulary(field).labels().collect()
    }

    /// Borrow the vocabulary for `field`.
    #[must_use]
    pub fn vocabulary(&self, field: Field) -> &EncoderVocabulary {
        self.shared(field)
    }

    /// Number of known labels for `field`.
    #[must_use]
    pub fn size(&self, field: Field) -> usize {
        self.vocabulary(field).len()
    }

    pub(crate) fn shared_vocabulary(&self, field: Field) -> Arc<EncoderVocabulary> {
        Arc::clone(self.shared(field))
    }

    const fn shared(&self, field: Field) -> &Arc<EncoderVocabulary> {
        match field {
            Field::Track => &self.track,
            Field::Subject => &self.subject,
            Field::Course => &self.course,
        }
    }
}
