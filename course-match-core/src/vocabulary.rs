//! Trained label vocabularies.
//!
//! A vocabulary is the immutable label-to-index mapping learned for one
//! [`Field`] at training time. Labels keep their trained order: the label at
//! position `i` encodes to `i + 1`, leaving [`SENTINEL_INDEX`] free for
//! unknown and padding slots.

use std::collections::HashMap;

use thiserror::Error;

use crate::Field;

/// Index reserved for unknown labels and history padding.
pub const SENTINEL_INDEX: u32 = 0;

/// Immutable bijection between known labels and indices `1..=N`.
///
/// # Examples
/// ```
/// use course_match_core::{EncoderVocabulary, Field};
///
/// # fn main() -> Result<(), course_match_core::VocabularyError> {
/// let vocabulary = EncoderVocabulary::new(Field::Subject, ["Anglais", "SVT"])?;
/// assert_eq!(vocabulary.lookup("Anglais"), Some(1));
/// assert_eq!(vocabulary.lookup("SVT"), Some(2));
/// assert_eq!(vocabulary.lookup("Philosophie"), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderVocabulary {
    field: Field,
    labels: Vec<String>,
    indices: HashMap<String, u32>,
}

/// Errors raised while building a vocabulary or a registry of vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    /// The trained label list was empty.
    #[error("{field} vocabulary must contain at least one label")]
    Empty {
        /// Field whose vocabulary was empty.
        field: Field,
    },
    /// The same label appeared twice, which would break the bijection.
    #[error("{field} vocabulary lists {label:?} more than once")]
    DuplicateLabel {
        /// Field whose vocabulary was malformed.
        field: Field,
        /// Repeated label.
        label: String,
    },
    /// The label count does not fit the model's index type.
    #[error("{field} vocabulary holds {len} labels, more than the index space allows")]
    TooLarge {
        /// Field whose vocabulary overflowed.
        field: Field,
        /// Number of labels supplied.
        len: usize,
    },
    /// A vocabulary was registered under the wrong field.
    #[error("expected a {expected} vocabulary but received one for {found}")]
    FieldMismatch {
        /// Slot being filled.
        expected: Field,
        /// Field the vocabulary was built for.
        found: Field,
    },
}

impl EncoderVocabulary {
    /// Build a vocabulary from labels in trained order.
    ///
    /// # Errors
    /// Returns [`VocabularyError::Empty`] for an empty list,
    /// [`VocabularyError::DuplicateLabel`] when a label repeats, and
    /// [`VocabularyError::TooLarge`] when the label count exceeds `u32`.
    pub fn new<I, S>(field: Field, labels: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owned: Vec<String> = labels.into_iter().map(Into::into).collect();
        if owned.is_empty() {
            return Err(VocabularyError::Empty { field });
        }
        if u32::try_from(owned.len()).is_err() {
            return Err(VocabularyError::TooLarge {
                field,
                len: owned.len(),
            });
        }

        let mut indices = HashMap::with_capacity(owned.len());
        for (index, label) in (1_u32..).zip(&owned) {
            if indices.insert(label.clone(), index).is_some() {
                return Err(VocabularyError::DuplicateLabel {
                    field,
                    label: label.clone(),
                });
            }
        }

        Ok(Self {
            field,
            labels: owned,
            indices,
        })
    }

    /// Field this vocabulary encodes.
    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    /// Number of known labels, `N`.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.labels.len()
    }

    /// Report whether the vocabulary has no labels.
    ///
    /// Always `false` for a constructed vocabulary.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Largest valid index, equal to `N`.
    #[must_use]
    pub fn max_index(&self) -> u32 {
        // Construction guarantees the length fits.
        u32::try_from(self.labels.len()).unwrap_or(u32::MAX)
    }

    /// Return the index for `label`, or `None` when it was never trained.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<u32> {
        self.indices.get(label).copied()
    }

    /// Return the label stored at `index`.
    ///
    /// The sentinel index has no label.
    #[must_use]
    pub fn label(&self, index: u32) -> Option<&str> {
        let position = usize::try_from(index.checked_sub(1)?).ok()?;
        self.labels.get(position).map(String::as_str)
    }

    /// Report whether `index` is the sentinel or a trained index.
    #[must_use]
    pub fn contains_index(&self, index: u32) -> bool {
        index <= self.max_index()
    }

    /// Iterate over labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn courses() -> EncoderVocabulary {
        EncoderVocabulary::new(Field::Course, ["Course A", "Course B", "Course C"])
            .expect("valid vocabulary")
    }

    #[rstest]
    fn indices_start_at_one(courses: EncoderVocabulary) {
        assert_eq!(courses.lookup("Course A"), Some(1));
        assert_eq!(courses.lookup("Course C"), Some(3));
        assert_eq!(courses.max_index(), 3);
    }

    #[rstest]
    fn labels_round_trip_through_indices(courses: EncoderVocabulary) {
        for label in courses.labels() {
            let index = courses.lookup(label).expect("known label");
            assert_eq!(courses.label(index), Some(label));
        }
    }

    #[rstest]
    fn sentinel_has_no_label(courses: EncoderVocabulary) {
        assert_eq!(courses.label(SENTINEL_INDEX), None);
        assert!(courses.contains_index(SENTINEL_INDEX));
        assert!(!courses.contains_index(4));
    }

    #[rstest]
    fn lookup_is_exact(courses: EncoderVocabulary) {
        assert_eq!(courses.lookup("course a"), None);
        assert_eq!(courses.lookup(" Course A"), None);
    }

    #[rstest]
    fn size_matches_the_largest_index(courses: EncoderVocabulary) {
        assert_eq!(courses.len(), 3);
        assert!(!courses.is_empty());
        assert_eq!(u32::try_from(courses.len()).ok(), Some(courses.max_index()));
    }

    #[rstest]
    fn rejects_empty_vocabulary() {
        let err = EncoderVocabulary::new(Field::Track, Vec::<String>::new())
            .expect_err("empty vocabulary");
        assert_eq!(err, VocabularyError::Empty { field: Field::Track });
    }

    #[rstest]
    fn rejects_duplicate_labels() {
        let err = EncoderVocabulary::new(Field::Subject, ["SVT", "Anglais", "SVT"])
            .expect_err("duplicate label");
        assert_eq!(
            err,
            VocabularyError::DuplicateLabel {
                field: Field::Subject,
                label: "SVT".to_owned(),
            }
        );
    }
}
