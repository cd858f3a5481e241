//! Assembly of encoded values into the model's named input bundle.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::{CategoricalEncoderRegistry, Field};

/// Input slot names the scoring model was trained with.
pub mod slot {
    /// Learner track index.
    pub const TRACK: &str = "Filliere";
    /// Normalised learner age.
    pub const AGE: &str = "Age";
    /// Fixed-length history of course indices.
    pub const HISTORY: &str = "History";
    /// Target course index.
    pub const TARGET_COURSE: &str = "Target_Course";
    /// Target subject index.
    pub const TARGET_SUBJECT: &str = "Target_Matiere";
}

/// Feature bundle in the exact shape the scoring model consumes.
///
/// Bundles are only produced by [`FeatureAssembler::assemble`], which checks
/// every index against its vocabulary and the history against the window.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureBundle {
    track_index: u32,
    normalized_age: f32,
    history_indices: Vec<u32>,
    target_course_index: u32,
    target_subject_index: u32,
}

/// A single named model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureInput<'a> {
    /// Whole-number categorical index.
    Index(u32),
    /// Floating point scalar.
    Scalar(f32),
    /// Fixed-length index sequence.
    Sequence(&'a [u32]),
}

impl EncodedFeatureBundle {
    /// Learner track index.
    #[must_use]
    pub const fn track_index(&self) -> u32 {
        self.track_index
    }

    /// Normalised learner age.
    #[must_use]
    pub const fn normalized_age(&self) -> f32 {
        self.normalized_age
    }

    /// History indices, oldest retained entry first.
    #[must_use]
    pub fn history_indices(&self) -> &[u32] {
        &self.history_indices
    }

    /// Target course index.
    #[must_use]
    pub const fn target_course_index(&self) -> u32 {
        self.target_course_index
    }

    /// Target subject index.
    #[must_use]
    pub const fn target_subject_index(&self) -> u32 {
        self.target_subject_index
    }

    /// Named inputs keyed by the model's slot names.
    #[must_use]
    pub fn inputs(&self) -> [(&'static str, FeatureInput<'_>); 5] {
        [
            (slot::TRACK, FeatureInput::Index(self.track_index)),
            (slot::AGE, FeatureInput::Scalar(self.normalized_age)),
            (slot::HISTORY, FeatureInput::Sequence(&self.history_indices)),
            (
                slot::TARGET_COURSE,
                FeatureInput::Index(self.target_course_index),
            ),
            (
                slot::TARGET_SUBJECT,
                FeatureInput::Index(self.target_subject_index),
            ),
        ]
    }
}

/// Structural invariant violations detected while assembling a bundle.
///
/// These indicate a defect upstream in the pipeline rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFeatureBundle {
    /// An index exceeded its vocabulary size.
    #[error("{slot} index {index} is outside 0..={max}")]
    IndexOutOfRange {
        /// Model slot holding the index.
        slot: &'static str,
        /// Offending index.
        index: u32,
        /// Largest valid index for the slot.
        max: u32,
    },
    /// The history sequence did not match the window length.
    #[error("history holds {actual} indices but the model expects {expected}")]
    HistoryLength {
        /// Window length the model was trained with.
        expected: usize,
        /// Length received.
        actual: usize,
    },
}

/// Wraps encoded values into [`EncodedFeatureBundle`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureAssembler {
    track_max: u32,
    subject_max: u32,
    course_max: u32,
    history_window: NonZeroUsize,
}

impl FeatureAssembler {
    /// Capture the vocabulary bounds of `registry` and the history window.
    #[must_use]
    pub fn new(registry: &CategoricalEncoderRegistry, history_window: NonZeroUsize) -> Self {
        Self {
            track_max: registry.vocabulary(Field::Track).max_index(),
            subject_max: registry.vocabulary(Field::Subject).max_index(),
            course_max: registry.vocabulary(Field::Course).max_index(),
            history_window,
        }
    }

    /// Assemble a bundle, checking every index against its bound.
    ///
    /// # Errors
    /// Returns [`InvalidFeatureBundle`] when an index falls outside `0..=N`
    /// for its field or the history length differs from the window.
    pub fn assemble(
        &self,
        track_index: u32,
        normalized_age: f32,
        history_indices: Vec<u32>,
        course_index: u32,
        subject_index: u32,
    ) -> Result<EncodedFeatureBundle, InvalidFeatureBundle> {
        check_index(slot::TRACK, track_index, self.track_max)?;
        check_index(slot::TARGET_COURSE, course_index, self.course_max)?;
        check_index(slot::TARGET_SUBJECT, subject_index, self.subject_max)?;

        let expected = self.history_window.get();
        if history_indices.len() != expected {
            return Err(InvalidFeatureBundle::HistoryLength {
                expected,
                actual: history_indices.len(),
            });
        }
        for &index in &history_indices {
            check_index(slot::HISTORY, index, self.course_max)?;
        }

        Ok(EncodedFeatureBundle {
            track_index,
            normalized_age,
            history_indices,
            target_course_index: course_index,
            target_subject_index: subject_index,
        })
    }
}

const fn check_index(slot: &'static str, index: u32, max: u32) -> Result<(), InvalidFeatureBundle> {
    if index > max {
        return Err(InvalidFeatureBundle::IndexOutOfRange { slot, index, max });
    }
    Ok(())
}
