//! Text normalisation applied once before any extractor runs.

use once_cell::sync::Lazy;
use regex::Regex;

// Every C0 control except tab and newline, plus DEL. Carriage returns are handled as line
// breaks before this runs.
static CONTROL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").expect("Invalid control char regex - this is a bug")
});

/// Normalises raw document text.
///
/// - control characters other than newline are removed (`\r\n` and lone `\r` count as newlines)
/// - every line is trimmed
/// - blank-line runs are collapsed, so the output never contains empty lines
///
/// `None` and empty input yield an empty string. The function is idempotent.
pub fn normalize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    raw.split(['\n', '\r'])
        .map(|line| CONTROL_RE.replace_all(line, ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn none_and_empty_yield_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some(" \n\n \t\n")), "");
    }

    #[test]
    fn strips_controls_and_blank_runs() {
        let raw = "  FORMULA MEDICA \r\n\r\n\r\n2 ACETAMINOFEN\u{0}500MG\u{c}  \n\n  Via: ORAL  ";
        assert_eq!(normalize(Some(raw)), "FORMULA MEDICA\n2 ACETAMINOFEN500MG\nVia: ORAL");
    }

    #[test]
    fn keeps_interior_tabs_and_accents() {
        assert_eq!(
            normalize(Some("Dirección:\tCALLE 10 # 5-20\n")),
            "Dirección:\tCALLE 10 # 5-20"
        );
    }

    proptest! {
        #[test]
        fn normalisation_is_idempotent(raw in "\\PC*") {
            let once = normalize(Some(&raw));
            prop_assert_eq!(normalize(Some(&once)), once.clone());
        }

        #[test]
        fn output_has_no_blank_lines(raw in "[a-zA-Z \\n\\r\\t\\x00-\\x1f]{0,200}") {
            let out = normalize(Some(&raw));
            prop_assert!(out.lines().all(|l| !l.trim().is_empty()));
        }
    }
}
