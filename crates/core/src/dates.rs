//! Date handling for extracted values.
//!
//! Dates are kept as the verbatim text found in the document. Parsing only happens to validate
//! a capture (failures are logged, never propagated) and to compute stay lengths.

use chrono::{NaiveDate, NaiveTime};
use hc_types::NonEmptyText;

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parses a document date in any of the accepted layouts (`DD/MM/YYYY` first).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Parses a document time (`HH:MM:SS` or `HH:MM`).
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

/// Wraps a captured date, logging when it does not parse.
///
/// The capture is returned verbatim either way.
pub(crate) fn checked_date(raw: &str) -> Option<NonEmptyText> {
    let text = NonEmptyText::optional(raw)?;
    if parse_date(text.as_str()).is_none() {
        tracing::warn!("unparseable date kept verbatim: {}", text);
    }
    Some(text)
}

/// Wraps a captured time, logging when it does not parse.
pub(crate) fn checked_time(raw: &str) -> Option<NonEmptyText> {
    let text = NonEmptyText::optional(raw)?;
    if parse_time(text.as_str()).is_none() {
        tracing::warn!("unparseable time kept verbatim: {}", text);
    }
    Some(text)
}

/// Whole calendar days between an admission and a discharge date.
///
/// Times of day do not change the count. A discharge earlier than the admission yields a
/// negative count. Missing or unparseable dates yield `None`.
pub fn stay_days(admission: Option<&str>, discharge: Option<&str>) -> Option<i64> {
    let admission_date = parse_date(admission?)?;
    let discharge_date = parse_date(discharge?)?;
    Some((discharge_date - admission_date).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_template_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10);
        assert_eq!(parse_date("10/01/2024"), expected);
        assert_eq!(parse_date("2024-01-10"), expected);
        assert_eq!(parse_date("10-01-2024"), expected);
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_time("08:00:00"), NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(parse_time("8:05"), NaiveTime::from_hms_opt(8, 5, 0));
    }

    #[test]
    fn stay_of_five_days() {
        assert_eq!(stay_days(Some("2024-01-10"), Some("2024-01-15")), Some(5));
        assert_eq!(stay_days(Some("10/01/2024"), Some("15/01/2024")), Some(5));
    }

    #[test]
    fn reversed_stay_is_negative() {
        assert_eq!(stay_days(Some("15/01/2024"), Some("10/01/2024")), Some(-5));
    }

    #[test]
    fn missing_or_malformed_stay_is_none() {
        assert_eq!(stay_days(Some("10/01/2024"), None), None);
        assert_eq!(stay_days(Some("99/99/2024"), Some("15/01/2024")), None);
    }

    #[test]
    fn malformed_capture_is_kept_verbatim() {
        let kept = checked_date("32/13/2024").expect("non-empty");
        assert_eq!(kept.as_str(), "32/13/2024");
        assert!(checked_date("  ").is_none());
    }
}
