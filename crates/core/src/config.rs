//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the extraction entry
//! points. The core never reads environment variables itself; the binaries hand optional raw
//! values to the `*_from_env_value` helpers below and build an [`ExtractionConfig`] from the
//! result.

use crate::constants::{
    DEFAULT_AI_TIMEOUT_SECS, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_AI_CHARS, DEFAULT_MAX_PAGES,
    DEFAULT_SATELLITE_WINDOW,
};
use crate::{ExtractionError, ExtractionResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Which extraction path the aggregator runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Pattern-based extractors only.
    #[default]
    PatternBased,
    /// Ask a text generator first and fall back to the pattern-based extractors on failure.
    AiAssisted,
}

impl ExtractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMode::PatternBased => "pattern_based",
            ExtractionMode::AiAssisted => "ai_assisted",
        }
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pattern_based" | "pattern" | "regex" => Ok(ExtractionMode::PatternBased),
            "ai_assisted" | "ai" => Ok(ExtractionMode::AiAssisted),
            other => Err(ExtractionError::InvalidInput(format!(
                "unknown extraction mode: {other}"
            ))),
        }
    }
}

/// Extraction configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionConfig {
    mode: ExtractionMode,
    satellite_window: usize,
    ai_timeout: Duration,
    max_ai_chars: usize,
    max_pages: usize,
}

impl ExtractionConfig {
    /// Create a new `ExtractionConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidInput` if the satellite window or the AI timeout is zero.
    pub fn new(
        mode: ExtractionMode,
        satellite_window: usize,
        ai_timeout: Duration,
    ) -> ExtractionResult<Self> {
        if satellite_window == 0 {
            return Err(ExtractionError::InvalidInput(
                "satellite_window must be at least 1".into(),
            ));
        }
        if ai_timeout.is_zero() {
            return Err(ExtractionError::InvalidInput(
                "ai_timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            mode,
            satellite_window,
            ai_timeout,
            max_ai_chars: DEFAULT_MAX_AI_CHARS,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Override the character cap applied before sending text to a generator.
    pub fn with_max_ai_chars(mut self, max_ai_chars: usize) -> ExtractionResult<Self> {
        if max_ai_chars == 0 {
            return Err(ExtractionError::InvalidInput(
                "max_ai_chars must be greater than zero".into(),
            ));
        }
        self.max_ai_chars = max_ai_chars;
        Ok(self)
    }

    /// Override the page cap applied by text sources.
    pub fn with_max_pages(mut self, max_pages: usize) -> ExtractionResult<Self> {
        if max_pages == 0 {
            return Err(ExtractionError::InvalidInput(
                "max_pages must be greater than zero".into(),
            ));
        }
        self.max_pages = max_pages;
        Ok(self)
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn satellite_window(&self) -> usize {
        self.satellite_window
    }

    pub fn ai_timeout(&self) -> Duration {
        self.ai_timeout
    }

    pub fn max_ai_chars(&self) -> usize {
        self.max_ai_chars
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            satellite_window: DEFAULT_SATELLITE_WINDOW,
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            max_ai_chars: DEFAULT_MAX_AI_CHARS,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the extraction mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the pattern-based mode.
pub fn extraction_mode_from_env_value(value: Option<String>) -> ExtractionResult<ExtractionMode> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<ExtractionMode>())
        .transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parse the satellite window from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_SATELLITE_WINDOW`].
pub fn satellite_window_from_env_value(value: Option<String>) -> ExtractionResult<usize> {
    count_from_env_value(value, DEFAULT_SATELLITE_WINDOW, "satellite window")
}

/// Parse the generator timeout (whole seconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_AI_TIMEOUT_SECS`].
pub fn ai_timeout_from_env_value(value: Option<String>) -> ExtractionResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS));
    };
    raw.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ExtractionError::InvalidInput(format!("invalid AI timeout {raw:?}: {e}")))
}

fn count_from_env_value(value: Option<String>, default: usize, what: &str) -> ExtractionResult<usize> {
    let Some(raw) = non_blank(value) else {
        return Ok(default);
    };
    raw.parse::<usize>()
        .map_err(|e| ExtractionError::InvalidInput(format!("invalid {what} {raw:?}: {e}")))
}

/// Parse the page cap from an optional string value, defaulting to [`DEFAULT_MAX_PAGES`].
pub fn max_pages_from_env_value(value: Option<String>) -> ExtractionResult<usize> {
    count_from_env_value(value, DEFAULT_MAX_PAGES, "page limit")
}

/// Parse the document cache capacity, defaulting to [`DEFAULT_CACHE_CAPACITY`].
pub fn cache_capacity_from_env_value(value: Option<String>) -> ExtractionResult<usize> {
    count_from_env_value(value, DEFAULT_CACHE_CAPACITY, "cache capacity")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_env_values_fall_back_to_defaults() {
        assert_eq!(
            extraction_mode_from_env_value(Some("  ".into())).unwrap(),
            ExtractionMode::PatternBased
        );
        assert_eq!(satellite_window_from_env_value(None).unwrap(), 5);
        assert_eq!(
            ai_timeout_from_env_value(Some(String::new())).unwrap(),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn counts_parse_or_default() {
        assert_eq!(max_pages_from_env_value(Some("12".into())).unwrap(), 12);
        assert_eq!(cache_capacity_from_env_value(None).unwrap(), 32);
        assert!(cache_capacity_from_env_value(Some("-1".into())).is_err());
    }

    #[test]
    fn mode_accepts_aliases() {
        assert_eq!("AI".parse::<ExtractionMode>().unwrap(), ExtractionMode::AiAssisted);
        assert_eq!(
            "pattern-based".parse::<ExtractionMode>().unwrap(),
            ExtractionMode::PatternBased
        );
        assert!("llm".parse::<ExtractionMode>().is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = ExtractionConfig::new(ExtractionMode::PatternBased, 0, Duration::from_secs(1))
            .expect_err("zero window");
        assert!(matches!(err, ExtractionError::InvalidInput(_)));
    }

    #[test]
    fn invalid_window_value_is_reported() {
        let err = satellite_window_from_env_value(Some("five".into())).expect_err("not a number");
        match err {
            ExtractionError::InvalidInput(msg) => assert!(msg.contains("five")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
