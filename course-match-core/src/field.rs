//! Categorical fields understood by the scoring model.
//!
//! Each field owns one trained vocabulary. The enum keeps field lookups
//! checked at compile time instead of relying on free-form strings.
//!
//! # Examples
//! ```
//! use course_match_core::Field;
//!
//! assert_eq!(Field::Track.as_str(), "track");
//! assert_eq!(Field::Course.to_string(), "course");
//! ```

/// A categorical input field with its own label vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Field {
    /// The learner's curricular track (branch).
    Track,
    /// The subject a target course belongs to.
    Subject,
    /// Course names, shared by the target course and the viewing history.
    Course,
}

impl Field {
    /// Every field, in the order the artefact lists them.
    pub const ALL: [Self; 3] = [Self::Track, Self::Subject, Self::Course];

    /// Return the field as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use course_match_core::Field;
    ///
    /// assert_eq!(Field::Subject.as_str(), "subject");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Subject => "subject",
            Self::Course => "course",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "track" | "branch" => Ok(Self::Track),
            "subject" => Ok(Self::Subject),
            "course" => Ok(Self::Course),
            _ => Err(format!("unknown field '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("track", Field::Track)]
    #[case("Branch", Field::Track)]
    #[case(" SUBJECT ", Field::Subject)]
    #[case("course", Field::Course)]
    fn parses_known_fields(#[case] raw: &str, #[case] expected: Field) {
        assert_eq!(Field::from_str(raw), Ok(expected));
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = Field::from_str("instructor").unwrap_err();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn display_matches_as_str() {
        for field in Field::ALL {
            assert_eq!(field.to_string(), field.as_str());
        }
    }
}
