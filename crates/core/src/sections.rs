//! Section location over normalised document text.
//!
//! A section starts at a header marker and runs until the next line that looks like a section
//! header, or the end of the text. Header lines in the institutional template are written in
//! capitals with no digits, e.g. `FORMULA MEDICA` or `ORDENES DE LABORATORIO`, except for a
//! trailing date and time on note headers.

use crate::patterns::{compile, DATE, TIME};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static HEADER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^[A-ZÁÉÍÓÚÜÑ][A-ZÁÉÍÓÚÜÑ ]{4,}[A-ZÁÉÍÓÚÜÑ .:/()\-]*$"));

// Note headers may carry their date: `EVOLUCION MEDICA 11/01/2024 08:30`.
static DATED_HEADER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"^(?P<title>[A-ZÁÉÍÓÚÜÑ][A-ZÁÉÍÓÚÜÑ ]{{4,}}[A-ZÁÉÍÓÚÜÑ .:/()\-]*?)[ \t]*(?:{DATE})(?:[ \t]+(?:{TIME}))?$"
    ))
});

// Uppercase labels and status stamps such as `FECHA: 10/01/2024` or `APLICADO 10/01/2024`.
static LABEL_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?:FECHA|HORA|APLICAD[OA]|ADMINISTRAD[OA]|REALIZAD[OA]|ORDENAD[OA])\b")
});

/// Returns `true` when a line looks like a section header: it starts with at least five
/// uppercase letters/spaces and contains nothing but uppercase letters, spaces and header
/// punctuation, optionally followed by a date and time.
pub fn is_section_header(line: &str) -> bool {
    let line = line.trim();
    if HEADER_LINE_RE.is_match(line) {
        return true;
    }
    DATED_HEADER_LINE_RE
        .captures(line)
        .and_then(|caps| caps.name("title"))
        .is_some_and(|title| !LABEL_TITLE_RE.is_match(title.as_str()))
}

/// One located section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section<'a> {
    header: &'a str,
    body: &'a str,
}

impl<'a> Section<'a> {
    /// The text matched by the header marker.
    pub fn header(&self) -> &'a str {
        self.header
    }

    /// The text from just after the header match to the next section header.
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Non-empty, trimmed body lines.
    pub fn lines(&self) -> Vec<&'a str> {
        self.body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Finds all sections introduced by a header marker.
///
/// The marker is compiled case-insensitive and multi-line, so `^` anchors to line starts. A
/// marker that is not a valid pattern is matched literally.
#[derive(Clone, Debug)]
pub struct SectionLocator {
    marker: Regex,
}

impl SectionLocator {
    pub fn new(marker: &str) -> Self {
        let marker = build_marker(marker).unwrap_or_else(|err| {
            tracing::debug!("section marker {marker:?} is not a pattern ({err}); matching literally");
            build_marker(&regex::escape(marker)).expect("Escaped marker must compile - this is a bug")
        });
        Self { marker }
    }

    /// Lazily yields every section in `text`, in document order.
    pub fn locate<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Section<'a>> + 'a {
        self.marker.find_iter(text).map(move |m| {
            let body_end = next_header_offset(text, m.end());
            Section {
                header: m.as_str(),
                body: &text[m.end()..body_end],
            }
        })
    }
}

fn build_marker(marker: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(marker)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}

/// Byte offset of the first header line starting after the line containing `from`, or the
/// end of the text.
fn next_header_offset(text: &str, from: usize) -> usize {
    let Some(newline) = text[from..].find('\n') else {
        return text.len();
    };

    let mut offset = from + newline + 1;
    for line in text[offset..].split_inclusive('\n') {
        if is_section_header(line) {
            return offset;
        }
        offset += line.len();
    }
    text.len()
}
