//! Shared text types for extracted clinical-record fields.
//!
//! Extracted values come from OCR/export-quality text, so they routinely carry stray
//! whitespace and line breaks. The types here normalise that noise at construction time so
//! downstream code never sees an empty or whitespace-only value.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a `NonEmptyText` with every internal whitespace run (including line breaks)
    /// collapsed to a single space.
    ///
    /// Used for single-line values such as names and descriptions that a PDF export may have
    /// wrapped across lines.
    pub fn collapsed(input: impl AsRef<str>) -> Result<Self, TextError> {
        let joined = input
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(joined)
    }

    /// Returns `None` instead of an error for empty input.
    ///
    /// Extracted fields are optional, so an empty capture is simply an absent value.
    pub fn optional(input: impl AsRef<str>) -> Option<Self> {
        Self::new(input).ok()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
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

impl PartialEq<str> for NonEmptyText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NonEmptyText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
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
    fn rejects_whitespace_only() {
        assert!(matches!(NonEmptyText::new(" \n\t "), Err(TextError::Empty)));
        assert!(NonEmptyText::optional("   ").is_none());
    }

    #[test]
    fn collapsed_joins_wrapped_lines() {
        let text = NonEmptyText::collapsed("  HOSPITAL\n  SAN   JOSE ").expect("non-empty");
        assert_eq!(text.as_str(), "HOSPITAL SAN JOSE");
    }

    #[test]
    fn serde_rejects_empty_strings() {
        let ok: NonEmptyText = serde_json::from_str("\" A09 \"").expect("deserialize");
        assert_eq!(ok, "A09");

        let err = serde_json::from_str::<NonEmptyText>("\"  \"");
        assert!(err.is_err());
    }
}
