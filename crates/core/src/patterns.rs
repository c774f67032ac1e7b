//! Pattern fragments and the bounded look-ahead window shared by the extractors.
//!
//! Satellite attributes (dose, route, frequency, status, application date) are associated with
//! an anchor line by proximity. Each field keeps the first value found scanning downwards from
//! the anchor; on a given line a labelled value (`Via: ORAL`) wins over a bare token.

use crate::dates::{checked_date, checked_time};
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

/// Date token: `DD/MM/YYYY` (also with two-digit years) or ISO `YYYY-MM-DD`.
pub(crate) const DATE: &str = r"\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2}";
/// Time token: `HH:MM` with optional seconds.
pub(crate) const TIME: &str = r"\d{1,2}:\d{2}(?::\d{2})?";

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid extractor regex - this is a bug")
}

/// A line opening a record with an explicit quantity: `2 ACETAMINOFEN 500MG`.
pub(crate) static QUANTITY_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?P<cantidad>\d+(?:[.,]\d+)?)\s+(?P<descripcion>[A-Za-zÁÉÍÓÚÑáéíóúñ(].*)$")
});

/// A first date token, optionally followed by a time.
pub(crate) static DATE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?P<fecha>{DATE})(?:\s+(?P<hora>{TIME}))?")));

/// A line starting with a field label such as `Estado de salida:` or `Participo?:`.
pub(crate) static LABEL_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^[A-Za-zÁÉÍÓÚÑáéíóúñ][A-Za-zÁÉÍÓÚÑáéíóúñ .]{1,40}\??\s*:")
});

static DOSE_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bDosis\s*:\s*(?P<value>[^\n]*\S)"));
static DOSE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)(?P<value>\b\d+(?:[.,]\d+)?\s?(?:(?:MG/KG|MG/ML|MCG|MEQ|MG|GR|ML|UI|G|U)\b|%))",
    )
});

static ROUTE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\bV[IÍ]A(?:\s+de\s+administraci[oó]n)?\s*:\s*(?P<value>[A-Za-zÁÉÍÓÚáéíóú]+)")
});
static ROUTE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b(?P<value>VO|IV|SC|IM|(?i:ORAL|INTRAVENOS[OA]|SUBCUT[AÁ]NE[OA]))\b")
});

static FREQUENCY_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bFrecuencia\s*:\s*(?P<value>[^\n]*\S)"));
static FREQUENCY_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)\b(?P<value>CADA\s+\d+\s*(?:HORAS?|H|D[IÍ]AS?|MINUTOS|MIN)|C/\s?\d+\s*(?:HORAS?|H)|DOSIS\s+[UÚ]NICA|[UÚ]NICA\s+DOSIS|AHORA|STAT|PRN|SI\s+ES\s+NECESARIO|UNA\s+VEZ\s+AL\s+D[IÍ]A|D[IÍ]A\s+DE\s+POR\s+MEDIO|DIARI[OA]|INFUSI[OÓ]N\s+CONTINUA)\b",
    )
});

static STATUS_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bEstado\s*:\s*(?P<value>[^\n]*\S)"));
static STATUS_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)\b(?P<value>APLICAD[OA]|ADMINISTRAD[OA]|SUSPENDID[OA]|SUSPENDE|PENDIENTE|CONTIN[UÚ]A|NUEVO|MODIFICAD[OA])\b",
    )
});

/// `Fecha y Hora de Aplicación: 10/01/2024 10:00`.
pub(crate) static APPLICATION_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)\bFecha\s*(?:y\s*Hora\s*)?(?:de\s*)?(?:Aplicaci[oó]n|Administraci[oó]n)\s*:?\s*(?P<fecha>{DATE})(?:\s+(?P<hora>{TIME}))?"
    ))
});

/// Lines scanned after an anchor: at most `max` lines, closed early by the next anchor.
pub(crate) fn window<'a>(
    lines: &'a [&'a str],
    anchor: usize,
    max: usize,
    is_anchor: impl Fn(&str) -> bool,
) -> &'a [&'a str] {
    let start = (anchor + 1).min(lines.len());
    let limit = start.saturating_add(max).min(lines.len());
    let end = lines[start..limit]
        .iter()
        .position(|line| is_anchor(line))
        .map_or(limit, |offset| start + offset);
    &lines[start..end]
}

/// Lines belonging to an anchor's record: everything up to the next anchor.
pub(crate) fn record_lines<'a>(
    lines: &'a [&'a str],
    anchor: usize,
    is_anchor: impl Fn(&str) -> bool,
) -> &'a [&'a str] {
    window(lines, anchor, usize::MAX, is_anchor)
}

fn first_value<'a, I>(lines: I, labelled: &Regex, bare: &Regex) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().find_map(|line| {
        labelled
            .captures(line)
            .or_else(|| bare.captures(line))
            .and_then(|caps| caps.name("value"))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// First date (and optional time) captured by `pattern` across `lines`.
pub(crate) fn first_date_time<'a, I>(
    lines: I,
    pattern: &Regex,
) -> Option<(NonEmptyText, Option<NonEmptyText>)>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().find_map(|line| {
        let caps = pattern.captures(line)?;
        let date = checked_date(caps.name("fecha")?.as_str())?;
        let time = caps.name("hora").and_then(|m| checked_time(m.as_str()));
        Some((date, time))
    })
}

/// The `value` group of the first line matching `pattern`.
pub(crate) fn labelled_value<'a, I>(lines: I, pattern: &Regex) -> Option<NonEmptyText>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().find_map(|line| {
        pattern
            .captures(line)
            .and_then(|caps| caps.name("value"))
            .and_then(|m| NonEmptyText::optional(m.as_str()))
    })
}

/// `true` when `text` carries a dose token such as `500MG` or `1 G`.
pub(crate) fn mentions_dose(text: &str) -> bool {
    DOSE_TOKEN_RE.is_match(text)
}

/// Satellite attributes collected around a medication anchor.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Satellites {
    pub dose: Option<NonEmptyText>,
    pub route: Option<NonEmptyText>,
    pub frequency: Option<NonEmptyText>,
    pub status: Option<NonEmptyText>,
    pub application_date: Option<NonEmptyText>,
    pub application_time: Option<NonEmptyText>,
}

impl Satellites {
    /// Scans `lines` in order; the anchor's own description should come first.
    pub fn scan(lines: &[&str]) -> Self {
        let upper = |value: String| NonEmptyText::optional(value.to_uppercase());
        let (application_date, application_time) =
            match first_date_time(lines.iter().copied(), &APPLICATION_RE) {
                Some((date, time)) => (Some(date), time),
                None => (None, None),
            };

        Self {
            dose: first_value(lines.iter().copied(), &DOSE_LABEL_RE, &DOSE_TOKEN_RE)
                .and_then(NonEmptyText::optional),
            route: first_value(lines.iter().copied(), &ROUTE_LABEL_RE, &ROUTE_TOKEN_RE)
                .and_then(upper),
            frequency: first_value(lines.iter().copied(), &FREQUENCY_LABEL_RE, &FREQUENCY_TOKEN_RE)
                .and_then(NonEmptyText::optional),
            status: first_value(lines.iter().copied(), &STATUS_LABEL_RE, &STATUS_TOKEN_RE)
                .and_then(upper),
            application_date,
            application_time,
        }
    }
}

/// Free text following `label` on its line plus the continuation lines, stopping at the next
/// labelled line or at a line rejected by `stop`.
pub(crate) fn labelled_block(
    lines: &[&str],
    label: &Regex,
    stop: impl Fn(&str) -> bool,
) -> Option<NonEmptyText> {
    let (index, m) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| label.find(line).map(|m| (i, m)))?;

    let mut parts = vec![lines[index][m.end()..].trim()];
    parts.extend(
        lines[index + 1..]
            .iter()
            .take_while(|line| !LABEL_LINE_RE.is_match(line) && !stop(line))
            .map(|line| line.trim()),
    );
    NonEmptyText::optional(
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
