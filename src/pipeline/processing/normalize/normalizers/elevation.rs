use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

const FEET_TO_METERS: f64 = 0.3048;

/// Convert a free-text elevation to meters.
///
/// Takes the smallest digit run in the text (so ranges resolve to their low end).
/// Text mentioning `m` anywhere is taken as meters already, anything else as feet.
/// Returns `None` when the text holds no digits at all.
pub fn elevation_to_meters(raw: &str) -> Option<f64> {
    let lowered = raw.to_lowercase();
    let lowest = DIGIT_RUN
        .find_iter(&lowered)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |a| a.min(n))))?;

    let meters = if lowered.contains('m') {
        lowest
    } else {
        lowest * FEET_TO_METERS
    };
    Some((meters * 10.0).round() / 10.0)
}
