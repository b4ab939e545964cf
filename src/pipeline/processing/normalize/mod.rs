pub mod normalizers;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::constants;
use crate::types::{FieldValue, Record};
use normalizers::{elevation_to_meters, normalize_date, title_case, NormalizedDate, StateTable};

/// Counts of cells the column normalizers could not interpret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    pub unparseable_dates: usize,
    pub unknown_elevations: usize,
    pub unknown_states: usize,
}

/// Applies the per-cell normalizers to renamed (target-schema) records, one column at a time.
pub struct ColumnNormalizer {
    states: StateTable,
}

impl ColumnNormalizer {
    pub fn new(states: StateTable) -> Self {
        Self { states }
    }

    #[instrument(skip_all, fields(records = records.len()))]
    pub fn normalize_columns(&self, records: &mut [Record]) -> NormalizationStats {
        let mut stats = NormalizationStats::default();

        for field in constants::DATE_FIELDS {
            for record in records.iter_mut() {
                let Some(raw) = record.text_owned(field) else { continue };
                let normalized = normalize_date(&raw);
                let value = match &normalized {
                    NormalizedDate::Parsed(_) | NormalizedDate::PartialYear(_) => {
                        FieldValue::Date(normalized.to_string())
                    }
                    NormalizedDate::Unparseable(original) => {
                        debug!(field, value = %original, "Unparseable date kept verbatim");
                        stats.unparseable_dates += 1;
                        FieldValue::Text(original.clone())
                    }
                    NormalizedDate::Blank(original) => FieldValue::Text(original.clone()),
                };
                record.set(field, value);
            }
        }

        for record in records.iter_mut() {
            let Some(raw) = record.text_owned(constants::MIN_ELEVATION) else { continue };
            let meters = elevation_to_meters(&raw);
            if meters.is_none() {
                debug!(value = %raw, "Elevation has no numeric part");
                stats.unknown_elevations += 1;
            }
            record.set(constants::MIN_ELEVATION, meters.into());
        }

        for record in records.iter_mut() {
            let Some(raw) = record.text_owned(constants::STATE_PROVINCE) else { continue };
            let expanded = self.states.expand(&raw).map(str::to_string);
            if expanded.is_none() {
                debug!(value = %raw, "No expansion for region code");
                stats.unknown_states += 1;
            }
            record.set(constants::STATE_PROVINCE, expanded.into());
        }

        for record in records.iter_mut() {
            if let Some(raw) = record.text_owned(constants::COUNTY) {
                record.set(constants::COUNTY, FieldValue::Text(title_case(&raw)));
            }
        }

        stats
    }
}
