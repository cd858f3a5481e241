//! Normalisation of raw track and subject spellings to trained labels.
#![forbid(unsafe_code)]

use std::collections::HashMap;

/// Track used when a learner's track is missing or unrecognised.
pub const DEFAULT_TRACK: &str = "Sciences SVT";

const TRACK_ALIASES: &[(&str, &str)] = &[
    ("SMA", "Sciences Maths (SM)"),
    ("SMB", "Sciences Maths (SM)"),
    ("SM", "Sciences Maths (SM)"),
    ("Sciences Mathématiques", "Sciences Maths (SM)"),
    ("Sciences Maths", "Sciences Maths (SM)"),
    ("Sciences Maths (SM)", "Sciences Maths (SM)"),
    ("PC", "Sciences Physiques (PC)"),
    ("Sciences Physiques", "Sciences Physiques (PC)"),
    ("Physique-Chimie", "Sciences Physiques (PC)"),
    ("Sciences Physiques (PC)", "Sciences Physiques (PC)"),
    ("SVT", "Sciences SVT"),
    ("Sciences SVT", "Sciences SVT"),
    ("EG", "Economie & Gestion"),
    ("Economie", "Economie & Gestion"),
    ("Gestion", "Economie & Gestion"),
    ("Economie & Gestion", "Economie & Gestion"),
];

const SUBJECT_ALIASES: &[(&str, &str)] = &[
    ("Mathématiques", "Mathematiques"),
    ("Mathematiques", "Mathematiques"),
    ("Anglais", "Anglais"),
    ("SVT", "SVT"),
    ("Physique-Chimie", "Physique-Chimie"),
    ("Physique Chimie", "Physique-Chimie"),
    ("Physique", "Physique-Chimie"),
    ("Chimie", "Physique-Chimie"),
    ("Economie-Gestion", "Economie-Gestion"),
    ("Economie", "Economie-Gestion"),
    ("Gestion", "Economie-Gestion"),
    ("Philosophie", "Philosophie"),
];

/// Maps the spellings stored upstream onto the labels the model was trained
/// with.
///
/// Keys are matched case-insensitively after trimming. Unmapped tracks fall
/// back to the default track; unmapped subjects pass through trimmed, so a
/// subject the model has never seen still surfaces as an unknown category.
///
/// # Examples
/// ```
/// use course_match_catalog::LabelAliases;
///
/// let aliases = LabelAliases::default();
/// assert_eq!(aliases.track(Some(" sma ")), "Sciences Maths (SM)");
/// assert_eq!(aliases.track(None), "Sciences SVT");
/// assert_eq!(aliases.subject("MATHÉMATIQUES"), "Mathematiques");
/// assert_eq!(aliases.subject("Histoire"), "Histoire");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAliases {
    tracks: HashMap<String, String>,
    subjects: HashMap<String, String>,
    default_track: String,
}

impl Default for LabelAliases {
    fn default() -> Self {
        let mut aliases = Self::empty(DEFAULT_TRACK);
        for (raw, trained) in TRACK_ALIASES {
            aliases.insert_track(raw, trained);
        }
        for (raw, trained) in SUBJECT_ALIASES {
            aliases.insert_subject(raw, trained);
        }
        aliases
    }
}

impl LabelAliases {
    /// Aliases with no mappings and the given fallback track.
    #[must_use]
    pub fn empty(default_track: impl Into<String>) -> Self {
        Self {
            tracks: HashMap::new(),
            subjects: HashMap::new(),
            default_track: default_track.into(),
        }
    }

    /// Add or replace a track mapping.
    #[must_use]
    pub fn with_track(mut self, raw: &str, trained: &str) -> Self {
        self.insert_track(raw, trained);
        self
    }

    /// Add or replace a subject mapping.
    #[must_use]
    pub fn with_subject(mut self, raw: &str, trained: &str) -> Self {
        self.insert_subject(raw, trained);
        self
    }

    /// Fallback for missing or unmapped tracks.
    #[must_use]
    pub fn default_track(&self) -> &str {
        &self.default_track
    }

    /// Trained track label for a raw track, if any.
    #[must_use]
    pub fn track(&self, raw: Option<&str>) -> &str {
        raw.and_then(|value| self.tracks.get(&fold(value)))
            .map_or_else(|| self.default_track.as_str(), String::as_str)
    }

    /// Trained subject label for a raw subject; unmapped values pass through.
    #[must_use]
    pub fn subject<'a>(&'a self, raw: &'a str) -> &'a str {
        self.subjects
            .get(&fold(raw))
            .map_or_else(|| raw.trim(), String::as_str)
    }

    fn insert_track(&mut self, raw: &str, trained: &str) {
        self.tracks.insert(fold(raw), trained.to_owned());
    }

    fn insert_subject(&mut self, raw: &str, trained: &str) {
        self.subjects.insert(fold(raw), trained.to_owned());
    }
}

fn fold(label: &str) -> String {
    label.trim().to_lowercase()
}
