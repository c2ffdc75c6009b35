//! # Triage Types
//!
//! Validated primitive types shared by the triage crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty, trimmed content.
///
/// Used for condition names, specialisations and canonical symptom labels, where a blank value
/// would silently match everything in substring comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, `TextError::Empty` is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased copy used for case-insensitive comparisons.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive comparison against arbitrary (untrimmed) input.
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  Chest pain \n").expect("non-empty");
        assert_eq!(text.as_str(), "Chest pain");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(" \t "), Err(TextError::Empty));
    }

    #[test]
    fn compares_ignoring_case() {
        let text = NonEmptyText::new("Shortness of breath").expect("non-empty");
        assert!(text.matches_ignore_case(" shortness OF breath "));
        assert!(!text.matches_ignore_case("shortness"));
        assert_eq!(text.folded(), "shortness of breath");
    }

    #[test]
    fn deserialize_rejects_blank_strings() {
        let err = serde_json::from_str::<NonEmptyText>("\"   \"").expect_err("blank");
        assert!(err.to_string().contains("text cannot be empty"));

        let ok: NonEmptyText = serde_json::from_str("\" Fever \"").expect("valid");
        assert_eq!(ok.as_str(), "Fever");
        assert_eq!(serde_json::to_string(&ok).expect("serialize"), "\"Fever\"");
    }
}
