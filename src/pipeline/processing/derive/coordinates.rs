use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::SourceColumns;
use crate::types::Record;

static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").expect("valid regex"));

/// Degree / minute / second text for one axis, as exported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmsInput {
    pub degrees: Option<String>,
    pub minutes: Option<String>,
    pub seconds: Option<String>,
}

impl DmsInput {
    fn to_decimal(&self) -> f64 {
        component(&self.degrees) + component(&self.minutes) / 60.0 + component(&self.seconds) / 3600.0
    }
}

/// Every legacy coordinate encoding a record may carry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateInput {
    pub utm: Option<String>,
    pub lat_lon: Option<String>,
    pub lat_lon_alt: Option<String>,
    pub latitude: DmsInput,
    pub longitude: DmsInput,
}

impl CoordinateInput {
    pub fn from_record(record: &Record, columns: &SourceColumns) -> Self {
        Self {
            utm: record.text_owned(&columns.utm),
            lat_lon: record.text_owned(&columns.lat_lon),
            lat_lon_alt: record.text_owned(&columns.lat_lon_alt),
            latitude: DmsInput {
                degrees: record.text_owned(&columns.lat_degree),
                minutes: record.text_owned(&columns.lat_minutes),
                seconds: record.text_owned(&columns.lat_seconds),
            },
            longitude: DmsInput {
                degrees: record.text_owned(&columns.lon_degree),
                minutes: record.text_owned(&columns.lon_minutes),
                seconds: record.text_owned(&columns.lon_seconds),
            },
        }
    }
}

/// Which encoding the coordinates were resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinateEncoding {
    Utm,
    LatLon,
    LatLonAlt,
    Dms,
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub verbatim: Option<String>,
    pub encoding: CoordinateEncoding,
}

impl Coordinates {
    fn absent() -> Self {
        Self { latitude: None, longitude: None, verbatim: None, encoding: CoordinateEncoding::Absent }
    }

    /// A combined lat/lon string was present but did not yield two numbers
    pub fn is_unparsed(&self) -> bool {
        matches!(self.encoding, CoordinateEncoding::LatLon | CoordinateEncoding::LatLonAlt)
            && self.latitude.is_none()
    }
}

/// Resolve decimal coordinates from whichever legacy encoding is present.
///
/// Precedence, lowest first: UTM (verbatim only), combined lat/lon, the alternate
/// combined field, then DMS components. Longitudes come out non-positive: every
/// record is from the Western Hemisphere, so a positive value is a sign error.
pub fn derive_coordinates(input: &CoordinateInput) -> Coordinates {
    let mut coords = Coordinates::absent();

    if let Some(utm) = &input.utm {
        coords = Coordinates {
            latitude: None,
            longitude: None,
            verbatim: Some(format!("UTM: {}", utm)),
            encoding: CoordinateEncoding::Utm,
        };
    }

    if let Some(text) = &input.lat_lon {
        coords = combined(text, CoordinateEncoding::LatLon);
    } else if let Some(text) = &input.lat_lon_alt {
        coords = combined(text, CoordinateEncoding::LatLonAlt);
    } else if input.latitude.degrees.is_some() || input.longitude.degrees.is_some() {
        coords = Coordinates {
            latitude: Some(input.latitude.to_decimal()),
            longitude: Some(input.longitude.to_decimal()),
            verbatim: Some(dms_verbatim(&input.latitude, &input.longitude)),
            encoding: CoordinateEncoding::Dms,
        };
    }

    if let Some(lon) = coords.longitude {
        if lon > 0.0 {
            coords.longitude = Some(-lon);
        }
    }
    coords
}

/// `"35.62N/83.5W"` → (35.62, 83.5); hemisphere letters are dropped.
fn parse_combined(text: &str) -> Option<(f64, f64)> {
    let cleaned = text.to_uppercase().replace(['N', 'W'], "");
    let mut parts = cleaned.split('/').map(|p| p.trim().parse::<f64>());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(lat)), Some(Ok(lon)), None) => Some((lat, lon)),
        _ => None,
    }
}

fn combined(text: &str, encoding: CoordinateEncoding) -> Coordinates {
    let parsed = parse_combined(text);
    Coordinates {
        latitude: parsed.map(|(lat, _)| lat),
        longitude: parsed.map(|(_, lon)| lon),
        verbatim: Some(text.to_string()),
        encoding,
    }
}

/// Numeric part of one DMS component; anything unreadable counts as zero.
fn component(value: &Option<String>) -> f64 {
    value
        .as_deref()
        .map(|v| NON_NUMERIC.replace_all(v, ""))
        .and_then(|digits| digits.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn dms_verbatim(lat: &DmsInput, lon: &DmsInput) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    format!(
        "lat: {}°, {}’, {}” lon:{}°, {}’, {}”",
        text(&lat.degrees),
        text(&lat.minutes),
        text(&lat.seconds),
        text(&lon.degrees),
        text(&lon.minutes),
        text(&lon.seconds),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dms(d: &str, m: &str, s: &str) -> DmsInput {
        DmsInput {
            degrees: Some(d.to_string()),
            minutes: Some(m.to_string()),
            seconds: Some(s.to_string()),
        }
    }

    #[test]
    fn test_utm_only_is_verbatim() {
        let input = CoordinateInput { utm: Some("17S 273000E 3940000N".into()), ..Default::default() };
        let coords = derive_coordinates(&input);
        assert_eq!(coords.latitude, None);
        assert_eq!(coords.longitude, None);
        assert_eq!(coords.verbatim.as_deref(), Some("UTM: 17S 273000E 3940000N"));
        assert_eq!(coords.encoding, CoordinateEncoding::Utm);
    }

    #[test]
    fn test_combined_beats_utm() {
        let input = CoordinateInput {
            utm: Some("17S 273000E 3940000N".into()),
            lat_lon: Some("35.6N/83.5W".into()),
            ..Default::default()
        };
        let coords = derive_coordinates(&input);
        assert_eq!(coords.latitude, Some(35.6));
        assert_eq!(coords.longitude, Some(-83.5));
        assert_eq!(coords.verbatim.as_deref(), Some("35.6N/83.5W"));
    }

    #[test]
    fn test_alternate_combined_field() {
        let input = CoordinateInput { lat_lon_alt: Some("35.1n / 83.9w".into()), ..Default::default() };
        let coords = derive_coordinates(&input);
        assert_eq!(coords.latitude, Some(35.1));
        assert_eq!(coords.longitude, Some(-83.9));
        assert_eq!(coords.encoding, CoordinateEncoding::LatLonAlt);
    }

    #[test]
    fn test_unparseable_combined_keeps_verbatim() {
        let input = CoordinateInput { lat_lon: Some("near the creek".into()), ..Default::default() };
        let coords = derive_coordinates(&input);
        assert_eq!(coords.latitude, None);
        assert_eq!(coords.verbatim.as_deref(), Some("near the creek"));
        assert!(coords.is_unparsed());
    }

    #[test]
    fn test_dms_conversion() {
        let input = CoordinateInput {
            latitude: dms("35°", "37'", "12\""),
            longitude: dms("83°", "30'", "0\""),
            ..Default::default()
        };
        let coords = derive_coordinates(&input);
        assert!((coords.latitude.unwrap() - 35.62).abs() < 1e-9);
        assert!((coords.longitude.unwrap() + 83.5).abs() < 1e-9);
        assert_eq!(
            coords.verbatim.as_deref(),
            Some("lat: 35°°, 37'’, 12\"” lon:83°°, 30'’, 0\"”")
        );
    }

    #[test]
    fn test_dms_bad_component_is_zero() {
        let input = CoordinateInput {
            latitude: DmsInput { degrees: Some("35".into()), minutes: Some("??".into()), seconds: None },
            longitude: dms("83", "30", "x"),
            ..Default::default()
        };
        let coords = derive_coordinates(&input);
        assert_eq!(coords.latitude, Some(35.0));
        assert_eq!(coords.longitude, Some(-83.5));
    }

    #[test]
    fn test_nothing_present() {
        let coords = derive_coordinates(&CoordinateInput::default());
        assert_eq!(coords, Coordinates::absent());
    }

    #[test]
    fn test_longitudes_never_positive() {
        for text in ["35/83", "35/-83", "35N/0W", "0/179.9"] {
            let input = CoordinateInput { lat_lon: Some(text.into()), ..Default::default() };
            let lon = derive_coordinates(&input).longitude.unwrap();
            assert!(lon <= 0.0, "{} gave {}", text, lon);
        }
    }
}
