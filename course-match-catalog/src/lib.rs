//! Batch ranking of candidate courses for a single learner.
//!
//! The recommendation pipeline scores one learner/course pair at a time.
//! This crate runs it over a whole catalogue the way a course listing needs:
//! it applies the caller-side policies the model was deployed with
//! ([`LabelAliases`] for track and subject spellings, [`AgePolicy`] for
//! missing or implausible ages), skips candidates that cannot be scored,
//! keeps scores above a minimum and returns the best first.

#![forbid(unsafe_code)]

mod age;
mod aliases;
mod rank;

pub use age::AgePolicy;
pub use aliases::{DEFAULT_TRACK, LabelAliases};
pub use rank::{
    CandidateCourse, CatalogRanker, LearnerProfile, RankOptions, RankedCourse, Ranking,
    ResolvedLearner, SkippedCandidate, rank_candidates,
};
