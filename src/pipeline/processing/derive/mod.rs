pub mod coordinates;
pub mod life_stage;
pub mod locality;
pub mod scientific_name;

use serde::Serialize;
use tracing::{debug, warn};

use crate::app::ports::NameMatcher;
use crate::config::{NameFailurePolicy, SourceColumns};
use crate::constants;
use crate::error::{MigrationError, Result};
use crate::observability::metrics;
use crate::types::{FieldValue, Record};

use coordinates::{derive_coordinates, CoordinateInput};
use life_stage::{derive_life_stage, LifeStageInput};
use locality::{derive_locality, LocalityInput};
use scientific_name::{NameResolver, ScientificNameInput};

pub use coordinates::{CoordinateEncoding, Coordinates};
pub use scientific_name::ResolvedName;

/// Whether a record survives derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Kept,
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivationStats {
    pub name_requests: usize,
    pub low_confidence_names: usize,
    pub name_failures: usize,
    pub skipped_records: usize,
    pub unparsed_coordinates: usize,
}

/// Runs every row deriver over a record: life stage, locality, scientific name, coordinates.
pub struct RowDeriver<'a, M: NameMatcher> {
    columns: &'a SourceColumns,
    /// `None` leaves exported names untouched
    resolver: Option<NameResolver<M>>,
    on_failure: NameFailurePolicy,
    stats: DerivationStats,
}

impl<'a, M: NameMatcher> RowDeriver<'a, M> {
    pub fn new(
        columns: &'a SourceColumns,
        resolver: Option<NameResolver<M>>,
        on_failure: NameFailurePolicy,
    ) -> Self {
        Self { columns, resolver, on_failure, stats: DerivationStats::default() }
    }

    pub fn stats(&self) -> DerivationStats {
        DerivationStats {
            name_requests: self.resolver.as_ref().map_or(0, NameResolver::requests),
            ..self.stats.clone()
        }
    }

    /// Derive all rows, dropping skipped ones. Fails only under `NameFailurePolicy::Abort`.
    pub fn derive_all(&mut self, records: Vec<Record>) -> Result<Vec<Record>> {
        let mut kept = Vec::with_capacity(records.len());
        for (i, mut record) in records.into_iter().enumerate() {
            match self.derive(&mut record)? {
                RowOutcome::Kept => kept.push(record),
                RowOutcome::Skipped => debug!(row = i, "Record skipped during derivation"),
            }
        }
        Ok(kept)
    }

    pub fn derive(&mut self, record: &mut Record) -> Result<RowOutcome> {
        let life_stage = derive_life_stage(&LifeStageInput::from_record(record, self.columns));
        record.set(constants::LIFE_STAGE, life_stage.into());

        let locality = derive_locality(&LocalityInput::from_record(record, self.columns));
        record.set(constants::LOCALITY, locality.into());

        if self.resolve_name(record)? == RowOutcome::Skipped {
            return Ok(RowOutcome::Skipped);
        }

        let coords = derive_coordinates(&CoordinateInput::from_record(record, self.columns));
        if coords.is_unparsed() {
            self.stats.unparsed_coordinates += 1;
            warn!(
                legacy_catalog_number = record.text(constants::OTHER_CATALOG_NUMBER).unwrap_or(""),
                verbatim = coords.verbatim.as_deref().unwrap_or(""),
                "Could not read latitude/longitude; keeping verbatim coordinates only"
            );
        }
        record.set(constants::DECIMAL_LATITUDE, coords.latitude.into());
        record.set(constants::DECIMAL_LONGITUDE, coords.longitude.into());
        record.set(constants::VERBATIM_COORDINATES, coords.verbatim.into());

        Ok(RowOutcome::Kept)
    }

    fn resolve_name(&mut self, record: &mut Record) -> Result<RowOutcome> {
        let Some(resolver) = self.resolver.as_mut() else {
            return Ok(RowOutcome::Kept);
        };
        let input = ScientificNameInput::from_record(record, self.columns);

        match resolver.resolve(&input) {
            Ok(Some(resolved)) => {
                metrics::name_lookup("matched");
                metrics::name_score(resolved.score);
                if resolved.low_confidence {
                    self.stats.low_confidence_names += 1;
                    metrics::name_lookup("low_confidence");
                }
                record.set(constants::SCIENTIFIC_NAME, FieldValue::Text(resolved.accepted_name));
                record.set(
                    constants::SCIENTIFIC_NAME_AUTHORSHIP,
                    FieldValue::Text(resolved.accepted_author),
                );
                Ok(RowOutcome::Kept)
            }
            Ok(None) => Ok(RowOutcome::Kept),
            Err(e) => {
                self.stats.name_failures += 1;
                metrics::name_lookup("failed");
                let legacy = input.legacy_catalog_number.as_deref().unwrap_or("");
                let target = input.target_catalog_number.as_deref().unwrap_or("");
                match self.on_failure {
                    NameFailurePolicy::Abort => Err(MigrationError::NameService(e)),
                    NameFailurePolicy::SkipRecord => {
                        warn!(legacy_catalog_number = legacy, target_catalog_number = target, "Name resolution failed, skipping record: {}", e);
                        self.stats.skipped_records += 1;
                        metrics::record_skipped();
                        Ok(RowOutcome::Skipped)
                    }
                    NameFailurePolicy::Empty => {
                        warn!(legacy_catalog_number = legacy, target_catalog_number = target, "Name resolution failed, leaving name empty: {}", e);
                        record.set(constants::SCIENTIFIC_NAME, FieldValue::Missing);
                        record.set(constants::SCIENTIFIC_NAME_AUTHORSHIP, FieldValue::Missing);
                        Ok(RowOutcome::Kept)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scientific_name::tests::StubMatcher;
    use super::*;

    fn specimen() -> Record {
        Record::from_cells(vec![
            ("otherCatalogNumber", "GRSM  102763"),
            ("catalogNumber", "GSMNP00030"),
            ("genus", "Trillium"),
            ("specificEpithet", "erectum"),
            ("scientificName", "Trillium erectum"),
            ("Age/Stage", "adult"),
            ("sex", "female"),
            ("stateProvince", "Tennessee"),
            ("county", "Blount"),
            ("locality", "Cades Cove"),
            ("Lat LongN/W", "35.6N/83.8W"),
        ])
    }

    #[test]
    fn test_derive_populates_all_fields() {
        let columns = SourceColumns::default();
        let stub = StubMatcher::new(vec![("Trillium erectum", "Trillium erectum", "L.", 1.0)]);
        let mut deriver = RowDeriver::new(
            &columns,
            Some(NameResolver::new(&stub, 0.98)),
            NameFailurePolicy::Empty,
        );
        let mut record = specimen();

        assert_eq!(deriver.derive(&mut record).unwrap(), RowOutcome::Kept);

        assert_eq!(record.text("lifeStage"), Some("adult, female"));
        assert_eq!(record.text("locality"), Some("Tennessee, Blount, Cades Cove"));
        assert_eq!(record.text("scientificNameAuthorship"), Some("L."));
        assert_eq!(record.get("decimalLatitude"), Some(&FieldValue::Number(35.6)));
        assert_eq!(record.get("decimalLongitude"), Some(&FieldValue::Number(-83.8)));
        assert_eq!(record.text("verbatimCoordinates"), Some("35.6N/83.8W"));
        assert_eq!(deriver.stats().name_requests, 1);
    }

    #[test]
    fn test_failure_policies() {
        let columns = SourceColumns::default();
        let stub = StubMatcher::new(vec![]);

        let mut empty = RowDeriver::new(&columns, Some(NameResolver::new(&stub, 0.98)), NameFailurePolicy::Empty);
        let mut record = specimen();
        assert_eq!(empty.derive(&mut record).unwrap(), RowOutcome::Kept);
        assert_eq!(record.get("scientificName"), Some(&FieldValue::Missing));
        assert_eq!(empty.stats().name_failures, 1);

        let mut skip = RowDeriver::new(&columns, Some(NameResolver::new(&stub, 0.98)), NameFailurePolicy::SkipRecord);
        let kept = skip.derive_all(vec![specimen(), specimen()]).unwrap();
        assert!(kept.is_empty());
        assert_eq!(skip.stats().skipped_records, 2);

        let mut abort = RowDeriver::new(&columns, Some(NameResolver::new(&stub, 0.98)), NameFailurePolicy::Abort);
        let err = abort.derive(&mut specimen()).unwrap_err();
        assert!(matches!(err, MigrationError::NameService(_)));
    }

    #[test]
    fn test_resolution_disabled_keeps_exported_name() {
        let columns = SourceColumns::default();
        let mut deriver: RowDeriver<'_, &StubMatcher> = RowDeriver::new(&columns, None, NameFailurePolicy::Abort);
        let mut record = specimen();

        deriver.derive(&mut record).unwrap();

        assert_eq!(record.text("scientificName"), Some("Trillium erectum"));
        assert!(record.get("scientificNameAuthorship").is_none());
    }
}
