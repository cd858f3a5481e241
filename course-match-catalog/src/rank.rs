//! Scoring a catalogue of candidate courses for one learner.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use course_match_core::{
    RecommendationError, RecommendationRequest, RecommendationService, ScoringEngine, Verdict,
};

use crate::{AgePolicy, LabelAliases};

/// Raw learner attributes as stored upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// Track spelling as stored; normalised through [`LabelAliases`].
    #[serde(default, alias = "branch")]
    pub track: Option<String>,
    /// Age in years, when known.
    #[serde(default)]
    pub age: Option<f64>,
    /// Titles of viewed courses, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
}

/// One course the learner could be offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCourse {
    /// Catalogue identifier.
    pub id: u64,
    /// Course title; used as the course label.
    pub title: String,
    /// Subject spelling, when the course has one.
    #[serde(default)]
    pub subject: Option<String>,
    /// Whether the learner already completed the course.
    #[serde(default)]
    pub completed: bool,
}

/// Filters applied while ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    /// Lowest displayed confidence kept in the ranking.
    pub min_score: f64,
    /// Maximum number of ranked courses returned.
    pub limit: usize,
    /// Drop courses the learner completed before scoring.
    pub exclude_completed: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            min_score: 0.6,
            limit: 10,
            exclude_completed: true,
        }
    }
}

/// A scored course that passed the filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCourse {
    /// Catalogue identifier.
    pub id: u64,
    /// Course title.
    pub title: String,
    /// Subject label sent to the model.
    pub subject: String,
    /// Confidence rounded to four decimals.
    pub score_confidence: f64,
    /// Whether the unrounded confidence clears the recommendation threshold.
    pub recommandation: bool,
    /// Verdict string.
    pub message: Verdict,
    /// Whether the learner already completed the course.
    pub completed: bool,
}

/// A candidate the pipeline could not score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    /// Catalogue identifier.
    pub id: u64,
    /// Stable error kind from [`RecommendationError::kind`].
    pub kind: String,
    /// Human-readable cause.
    pub detail: String,
}

/// Learner inputs after aliasing and age defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLearner {
    /// Trained track label.
    pub track: String,
    /// Age fed to the normaliser.
    pub age: f64,
    /// Number of history entries sent.
    pub history_len: usize,
}

/// Result of ranking a catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Learner inputs used for every candidate.
    pub learner: ResolvedLearner,
    /// Courses kept before the limit was applied.
    pub total_recommendations: usize,
    /// Threshold applied to the displayed confidence.
    pub min_score: f64,
    /// Kept courses, best first, at most `limit` long.
    pub recommendations: Vec<RankedCourse>,
    /// Candidates whose scoring failed.
    pub skipped: Vec<SkippedCandidate>,
}

/// Ranks candidate courses with a shared [`RecommendationService`].
///
/// # Examples
/// ```
/// use course_match_catalog::{CandidateCourse, CatalogRanker, LearnerProfile, RankOptions};
/// use course_match_core::test_support::FixedScoringEngine;
/// use course_match_core::{
///     AgeNormalizer, CategoricalEncoderRegistry, DEFAULT_HISTORY_WINDOW, EncoderVocabulary,
///     Field, RecommendationService,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = CategoricalEncoderRegistry::new(
///     EncoderVocabulary::new(Field::Track, ["Sciences SVT"])?,
///     EncoderVocabulary::new(Field::Subject, ["SVT"])?,
///     EncoderVocabulary::new(Field::Course, ["Cells", "Genetics"])?,
/// )?;
/// let service = RecommendationService::new(
///     registry,
///     DEFAULT_HISTORY_WINDOW,
///     AgeNormalizer::new(17.0, 1.0)?,
///     FixedScoringEngine::new(0.9),
/// );
/// let learner = LearnerProfile {
///     track: Some("SVT".into()),
///     age: Some(17.0),
///     history: vec![],
/// };
/// let candidates = [CandidateCourse {
///     id: 1,
///     title: "Genetics".into(),
///     subject: Some("svt".into()),
///     completed: false,
/// }];
/// let ranking =
///     CatalogRanker::default().rank(&service, &learner, &candidates, RankOptions::default())?;
/// assert_eq!(ranking.recommendations.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRanker {
    aliases: LabelAliases,
    age_policy: AgePolicy,
}

impl CatalogRanker {
    /// Ranker with explicit caller policies.
    #[must_use]
    pub const fn new(aliases: LabelAliases, age_policy: AgePolicy) -> Self {
        Self {
            aliases,
            age_policy,
        }
    }

    /// Alias table in use.
    #[must_use]
    pub const fn aliases(&self) -> &LabelAliases {
        &self.aliases
    }

    /// Normalise the learner's track and age.
    #[must_use]
    pub fn resolve_learner(&self, learner: &LearnerProfile) -> ResolvedLearner {
        ResolvedLearner {
            track: self.aliases.track(learner.track.as_deref()).to_owned(),
            age: self.age_policy.resolve(learner.age),
            history_len: learner.history.len(),
        }
    }

    /// Score every eligible candidate and return the filtered, sorted list.
    ///
    /// Completed courses (when excluded) and courses without a subject are
    /// dropped before scoring. Unknown categories and inference failures are
    /// reported in [`Ranking::skipped`] and do not stop the batch.
    ///
    /// # Errors
    /// Returns [`RecommendationError::ModelUnavailable`] as soon as the
    /// engine reports it, since no candidate could be scored.
    pub fn rank<E: ScoringEngine>(
        &self,
        service: &RecommendationService<E>,
        learner: &LearnerProfile,
        candidates: &[CandidateCourse],
        options: RankOptions,
    ) -> Result<Ranking, RecommendationError> {
        let resolved = self.resolve_learner(learner);
        let history: Vec<String> = learner
            .history
            .iter()
            .map(|title| title.trim().to_owned())
            .collect();

        let mut kept = Vec::new();
        let mut skipped = Vec::new();
        for candidate in candidates {
            if options.exclude_completed && candidate.completed {
                continue;
            }
            let Some(raw_subject) = candidate.subject.as_deref() else {
                log::debug!("course {} has no subject; not scored", candidate.id);
                continue;
            };
            let subject = self.aliases.subject(raw_subject);
            let request = RecommendationRequest {
                learner_track: resolved.track.clone(),
                learner_age: resolved.age,
                learner_history: history.clone(),
                target_course_name: candidate.title.trim().to_owned(),
                target_subject: subject.to_owned(),
            };
            match service.predict(&request) {
                Ok(prediction) => {
                    let response = prediction.response();
                    log::debug!(
                        "course {} scored {} for track {:?}",
                        candidate.id,
                        response.score_confidence,
                        resolved.track
                    );
                    if response.score_confidence >= options.min_score {
                        kept.push(RankedCourse {
                            id: candidate.id,
                            title: candidate.title.clone(),
                            subject: subject.to_owned(),
                            score_confidence: response.score_confidence,
                            recommandation: response.recommandation,
                            message: response.message,
                            completed: candidate.completed,
                        });
                    }
                }
                Err(err @ RecommendationError::ModelUnavailable { .. }) => return Err(err),
                Err(err) => {
                    log::warn!("course {} skipped: {err}", candidate.id);
                    skipped.push(SkippedCandidate {
                        id: candidate.id,
                        kind: err.kind().to_owned(),
                        detail: err.to_string(),
                    });
                }
            }
        }

        kept.sort_by(|left, right| right.score_confidence.total_cmp(&left.score_confidence));
        let total_recommendations = kept.len();
        kept.truncate(options.limit);
        Ok(Ranking {
            learner: resolved,
            total_recommendations,
            min_score: options.min_score,
            recommendations: kept,
            skipped,
        })
    }
}

/// Rank `candidates` with the default aliases and age policy.
///
/// # Errors
/// See [`CatalogRanker::rank`].
pub fn rank_candidates<E: ScoringEngine>(
    service: &RecommendationService<E>,
    learner: &LearnerProfile,
    candidates: &[CandidateCourse],
    options: RankOptions,
) -> Result<Ranking, RecommendationError> {
    CatalogRanker::default().rank(service, learner, candidates, options)
}
