use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{MigrationError, Result};

/// Everything about one institution's spreadsheet layout and the name service,
/// loaded from TOML. Every section falls back to the ICMS defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub merge: MergeConfig,
    pub columns: SourceColumns,
    pub mapping: Vec<MappingEntry>,
    /// Two-letter region code → full name
    pub states: BTreeMap<String, String>,
    pub name_service: NameServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Legacy catalog number column in the primary export
    pub primary_id_column: String,
    /// Legacy catalog number column in the cross-reference list
    pub crossref_id_column: String,
    /// Target catalog number column in the cross-reference list
    pub crossref_target_column: String,
    /// Institutional prefix stripped from legacy ids before joining
    pub legacy_id_prefix: String,
}

/// Source-only columns the row derivers read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceColumns {
    pub age_stage: String,
    pub age: String,
    pub network: String,
    pub subspecies: String,
    pub variety: String,
    pub utm: String,
    pub lat_lon: String,
    pub lat_lon_alt: String,
    pub lat_degree: String,
    pub lat_minutes: String,
    pub lat_seconds: String,
    pub lon_degree: String,
    pub lon_minutes: String,
    pub lon_seconds: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameServiceConfig {
    /// When false, scientific names are left as exported
    pub enabled: bool,
    pub url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    /// Pause between consecutive requests
    pub delay_ms: u64,
    /// Scores below this are flagged for review
    pub min_confidence: f64,
    pub on_failure: NameFailurePolicy,
}

/// What to do with a record whose name lookup ultimately fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NameFailurePolicy {
    /// Abort the whole run
    Abort,
    /// Drop the record from the output
    SkipRecord,
    /// Keep the record with empty accepted name and author
    #[default]
    Empty,
}

impl std::str::FromStr for NameFailurePolicy {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(Self::Abort),
            "skip_record" | "skip" => Ok(Self::SkipRecord),
            "empty" => Ok(Self::Empty),
            other => Err(MigrationError::Config(format!(
                "Unknown name failure policy '{}' (expected abort, skip_record or empty)",
                other
            ))),
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            merge: MergeConfig::default(),
            columns: SourceColumns::default(),
            mapping: constants::DEFAULT_FIELD_MAPPING
                .iter()
                .map(|(s, t)| MappingEntry { source: s.to_string(), target: t.to_string() })
                .collect(),
            states: constants::DEFAULT_STATES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            name_service: NameServiceConfig::default(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            primary_id_column: constants::PRIMARY_LEGACY_ID.to_string(),
            crossref_id_column: constants::CROSSREF_LEGACY_ID.to_string(),
            crossref_target_column: constants::CROSSREF_TARGET_ID.to_string(),
            legacy_id_prefix: constants::DEFAULT_LEGACY_ID_PREFIX.to_string(),
        }
    }
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            age_stage: constants::SRC_AGE_STAGE.to_string(),
            age: constants::SRC_AGE.to_string(),
            network: constants::SRC_NETWORK.to_string(),
            subspecies: constants::SRC_SUBSPECIES.to_string(),
            variety: constants::SRC_VARIETY.to_string(),
            utm: constants::SRC_UTM.to_string(),
            lat_lon: constants::SRC_LAT_LON.to_string(),
            lat_lon_alt: constants::SRC_LAT_LON_ALT.to_string(),
            lat_degree: constants::SRC_LAT_DEGREE.to_string(),
            lat_minutes: constants::SRC_LAT_MINUTES.to_string(),
            lat_seconds: constants::SRC_LAT_SECONDS.to_string(),
            lon_degree: constants::SRC_LON_DEGREE.to_string(),
            lon_minutes: constants::SRC_LON_MINUTES.to_string(),
            lon_seconds: constants::SRC_LON_SECONDS.to_string(),
        }
    }
}

impl Default for NameServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: constants::DEFAULT_NAME_SERVICE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            backoff_ms: 500,
            delay_ms: 0,
            min_confidence: constants::DEFAULT_MIN_CONFIDENCE,
            on_failure: NameFailurePolicy::default(),
        }
    }
}

impl MigrationConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MigrationError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MigrationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(constants::NAME_SERVICE_URL_ENV) {
            if !url.trim().is_empty() {
                self.name_service.url = url.trim().to_string();
            }
        }
    }

    /// The field mapping must be one-to-one and the confidence threshold a probability.
    pub fn validate(&self) -> Result<()> {
        let mut sources = HashSet::new();
        let mut targets = HashSet::new();
        for entry in &self.mapping {
            if !sources.insert(entry.source.as_str()) {
                return Err(MigrationError::Config(format!(
                    "Source column '{}' is mapped more than once",
                    entry.source
                )));
            }
            if !targets.insert(entry.target.as_str()) {
                return Err(MigrationError::Config(format!(
                    "Target field '{}' is mapped more than once",
                    entry.target
                )));
            }
        }
        if let Some(derived) = constants::DERIVED_COLUMNS.iter().find(|d| targets.contains(**d)) {
            return Err(MigrationError::Config(format!(
                "Target field '{}' is derived and cannot be mapped",
                derived
            )));
        }
        if !(0.0..=1.0).contains(&self.name_service.min_confidence) {
            return Err(MigrationError::Config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.name_service.min_confidence
            )));
        }
        if self.merge.primary_id_column.trim().is_empty()
            || self.merge.crossref_id_column.trim().is_empty()
        {
            return Err(MigrationError::Config("Join columns must not be empty".to_string()));
        }
        Ok(())
    }

    /// Target name for a source column, if mapped
    pub fn target_for(&self, source: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.target.as_str())
    }
}
