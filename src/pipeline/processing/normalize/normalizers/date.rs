use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

/// Outcome of normalizing a free-text date cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    /// Empty or whitespace-only input, passed through untouched
    Blank(String),
    /// A bare year; month and day unknown
    PartialYear(String),
    Parsed(NaiveDate),
    /// Nothing matched; the trimmed original is kept
    Unparseable(String),
}

impl NormalizedDate {
    pub fn is_parsed(&self) -> bool {
        matches!(self, NormalizedDate::Parsed(_) | NormalizedDate::PartialYear(_))
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedDate::Blank(original) => f.write_str(original),
            NormalizedDate::PartialYear(year) => write!(f, "{}-00-00", year),
            NormalizedDate::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            NormalizedDate::Unparseable(original) => f.write_str(original),
        }
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Month-year forms; the day is pinned to the first of the month
const MONTH_YEAR_FORMATS: &[&str] = &["%d %B %Y", "%d %b %Y", "%d %m/%y", "%d %m/%Y"];

/// chrono's `%Y` takes any digit count, so `4/25/18` would otherwise read as year 18
const MIN_YEAR: i32 = 1000;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

/// Normalize a catalog date: blank stays blank, a bare year becomes a partial date,
/// anything chrono can read becomes `YYYY-MM-DD`, and the rest is kept as written.
pub fn normalize_date(raw: &str) -> NormalizedDate {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return NormalizedDate::Blank(raw.to_string());
    }
    if cleaned.len() == 4 && cleaned.chars().all(|c| c.is_ascii_digit()) {
        return NormalizedDate::PartialYear(cleaned.to_string());
    }
    match parse_date(cleaned) {
        Some(date) => NormalizedDate::Parsed(date),
        None => NormalizedDate::Unparseable(cleaned.to_string()),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    // Collapse runs of whitespace so "May  3,  1950" still matches
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok().and_then(plausible))
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok().and_then(|dt| plausible(dt.date())))
    {
        return Some(dt);
    }
    if let Some(date) = DateTime::parse_from_rfc3339(&value).ok().and_then(|dt| plausible(dt.date_naive())) {
        return Some(date);
    }
    let first_of_month = format!("1 {}", value);
    MONTH_YEAR_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&first_of_month, fmt).ok().and_then(plausible))
}
