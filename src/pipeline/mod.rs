pub mod merge;
pub mod processing;
pub mod projection;

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

use crate::app::ports::NameMatcher;
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::infra::csv_table;
use crate::observability::metrics;
use crate::types::{OutputTable, RawTable};
use processing::derive::scientific_name::NameResolver;
use processing::derive::{DerivationStats, RowDeriver};
use processing::normalize::normalizers::StateTable;
use processing::normalize::{ColumnNormalizer, NormalizationStats};

/// Summary of a complete migration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub primary_rows: usize,
    pub crossref_rows: usize,
    pub merged_records: usize,
    pub unmatched_primary: usize,
    pub unmatched_crossref: usize,
    pub emitted_records: usize,
    pub normalization: NormalizationStats,
    pub derivation: DerivationStats,
    pub duration_secs: f64,
}

/// Load → Merge → Rename → Normalize-and-Derive → Project-and-Emit.
///
/// Every stage finishes over the whole table before the next begins.
pub struct Pipeline<'a> {
    config: &'a MigrationConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a MigrationConfig) -> Self {
        Self { config }
    }

    /// Run every stage against files on disk and write the output table.
    #[instrument(skip_all, fields(primary = %primary_path.display(), crossref = %crossref_path.display()))]
    pub fn run(
        &self,
        primary_path: &Path,
        crossref_path: &Path,
        output_path: &Path,
        matcher: Option<&dyn NameMatcher>,
    ) -> Result<PipelineReport> {
        let started = Instant::now();

        info!("📥 Loading input tables");
        let primary = csv_table::read_table(primary_path)?;
        let crossref = csv_table::read_table(crossref_path)?;
        metrics::stage_duration("load", started.elapsed().as_secs_f64());

        let (table, mut report) = self.transform(&primary, &crossref, matcher)?;

        let t_emit = Instant::now();
        csv_table::write_table(output_path, &table)?;
        metrics::stage_duration("emit", t_emit.elapsed().as_secs_f64());
        info!(rows = table.len(), output = %output_path.display(), "💾 Wrote output table");

        report.duration_secs = started.elapsed().as_secs_f64();
        Ok(report)
    }

    /// The in-memory part of the run: everything between loading and writing.
    pub fn transform(
        &self,
        primary: &RawTable,
        crossref: &RawTable,
        matcher: Option<&dyn NameMatcher>,
    ) -> Result<(OutputTable, PipelineReport)> {
        let config = self.config;
        let mut report = PipelineReport {
            primary_rows: primary.rows.len(),
            crossref_rows: crossref.rows.len(),
            ..Default::default()
        };
        metrics::records_loaded("primary", primary.rows.len());
        metrics::records_loaded("crossref", crossref.rows.len());

        // Merge
        let t_merge = Instant::now();
        let merged = merge::merge_tables(primary, crossref, &config.merge)?;
        report.merged_records = merged.records.len();
        report.unmatched_primary = merged.unmatched_primary;
        report.unmatched_crossref = merged.unmatched_crossref;
        metrics::records_merged(merged.records.len());
        metrics::stage_duration("merge", t_merge.elapsed().as_secs_f64());

        // Rename
        let mut records = merged.records;
        projection::rename_fields(&mut records, &config.mapping);

        // Normalize columns, then derive rows
        let t_derive = Instant::now();
        info!(records = records.len(), "🔧 Normalizing columns");
        let normalizer = ColumnNormalizer::new(StateTable::from_config(&config.states));
        report.normalization = normalizer.normalize_columns(&mut records);

        info!(records = records.len(), "🔧 Deriving row fields");
        let resolver = matcher
            .filter(|_| config.name_service.enabled)
            .map(|m| NameResolver::new(m, config.name_service.min_confidence));
        let mut deriver = RowDeriver::new(&config.columns, resolver, config.name_service.on_failure);
        let records = deriver.derive_all(records)?;
        report.derivation = deriver.stats();
        metrics::stage_duration("derive", t_derive.elapsed().as_secs_f64());

        // Project
        let table = projection::project(records, &config.mapping);
        report.emitted_records = table.len();
        metrics::records_emitted(table.len());

        info!(
            emitted = report.emitted_records,
            skipped = report.derivation.skipped_records,
            low_confidence = report.derivation.low_confidence_names,
            name_requests = report.derivation.name_requests,
            "✅ Transformation complete"
        );
        Ok((table, report))
    }
}
