//! Metrics for migration runs
//!
//! Recording is always safe: without an installed recorder the `metrics` macros are no-ops.
//! The binary installs a Prometheus recorder and can dump a text snapshot after the run.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;

/// Every metric name the migrator emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RecordsLoaded,
    RecordsMerged,
    RecordsEmitted,
    RecordsSkipped,
    NameLookups,
    NameScore,
    StageDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricName::RecordsLoaded => "migrator_records_loaded_total",
            MetricName::RecordsMerged => "migrator_records_merged_total",
            MetricName::RecordsEmitted => "migrator_records_emitted_total",
            MetricName::RecordsSkipped => "migrator_records_skipped_total",
            MetricName::NameLookups => "migrator_name_lookups_total",
            MetricName::NameScore => "migrator_name_score",
            MetricName::StageDuration => "migrator_stage_duration_seconds",
        };
        f.write_str(name)
    }
}

/// Install the global Prometheus recorder.
pub fn init() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))
}

pub fn records_loaded(table: &'static str, count: usize) {
    ::metrics::counter!(MetricName::RecordsLoaded.to_string(), "table" => table).increment(count as u64);
}

pub fn records_merged(count: usize) {
    ::metrics::counter!(MetricName::RecordsMerged.to_string()).increment(count as u64);
}

pub fn records_emitted(count: usize) {
    ::metrics::counter!(MetricName::RecordsEmitted.to_string()).increment(count as u64);
}

pub fn record_skipped() {
    ::metrics::counter!(MetricName::RecordsSkipped.to_string()).increment(1);
}

/// `outcome` is one of `matched`, `low_confidence`, `failed`
pub fn name_lookup(outcome: &'static str) {
    ::metrics::counter!(MetricName::NameLookups.to_string(), "outcome" => outcome).increment(1);
}

pub fn name_score(score: f64) {
    ::metrics::histogram!(MetricName::NameScore.to_string()).record(score);
}

pub fn stage_duration(stage: &'static str, secs: f64) {
    ::metrics::histogram!(MetricName::StageDuration.to_string(), "stage" => stage).record(secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(MetricName::RecordsEmitted.to_string(), "migrator_records_emitted_total");
        assert_eq!(MetricName::NameLookups.to_string(), "migrator_name_lookups_total");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        records_emitted(3);
        name_lookup("matched");
        name_score(0.99);
    }
}
