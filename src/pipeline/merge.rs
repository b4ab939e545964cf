use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, instrument, warn};

use crate::config::MergeConfig;
use crate::error::{MigrationError, Result};
use crate::types::{CrossReferenceEntry, RawTable, Record};

/// Joined records plus how many rows on each side found no partner
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub records: Vec<Record>,
    pub unmatched_primary: usize,
    pub unmatched_crossref: usize,
}

/// Strip the institutional prefix and surrounding whitespace from a legacy catalog number
/// (`"GRSM  102763"` → `"102763"`).
pub fn normalize_legacy_id(raw: &str, prefix: &str) -> String {
    let trimmed = raw.trim();
    let stripped = if prefix.is_empty() {
        trimmed
    } else {
        trimmed.strip_prefix(prefix).unwrap_or(trimmed)
    };
    stripped.trim().to_string()
}

fn require_column(table: &RawTable, name: &str, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(MigrationError::MissingColumn {
            table: name.to_string(),
            column: column.to_string(),
        })
    }
}

/// Read the cross-reference list, rejecting any legacy id that appears more than once.
///
/// Each entry is paired with the row it came from; rows without a legacy id are left out.
pub fn cross_reference_entries<'a>(
    crossref: &'a RawTable,
    config: &MergeConfig,
) -> Result<Vec<(CrossReferenceEntry, &'a Record)>> {
    require_column(crossref, "cross-reference", &config.crossref_id_column)?;

    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    let mut entries = Vec::with_capacity(crossref.rows.len());

    for row in &crossref.rows {
        let Some(raw) = row.text(&config.crossref_id_column) else { continue };
        let legacy_id = normalize_legacy_id(raw, &config.legacy_id_prefix);
        if legacy_id.is_empty() {
            continue;
        }
        if !seen.insert(legacy_id.clone()) {
            duplicates.insert(legacy_id.clone());
        }
        let entry = CrossReferenceEntry {
            legacy_id,
            target_id: row.text_owned(&config.crossref_target_column).unwrap_or_default(),
        };
        entries.push((entry, row));
    }

    if !duplicates.is_empty() {
        return Err(MigrationError::DuplicateCrossReference {
            ids: duplicates.into_iter().collect(),
        });
    }
    Ok(entries)
}

/// Inner-join the primary export with the cross-reference list on the normalized legacy id.
///
/// Output follows cross-reference order; a primary row overrides cross-reference fields of
/// the same name. Rows present in only one table are dropped.
#[instrument(skip_all, fields(primary = primary.rows.len(), crossref = crossref.rows.len()))]
pub fn merge_tables(primary: &RawTable, crossref: &RawTable, config: &MergeConfig) -> Result<MergeOutcome> {
    require_column(primary, "primary", &config.primary_id_column)?;
    let entries = cross_reference_entries(crossref, config)?;

    let mut by_id: HashMap<String, Vec<&Record>> = HashMap::new();
    for row in &primary.rows {
        if let Some(raw) = row.text(&config.primary_id_column) {
            by_id
                .entry(normalize_legacy_id(raw, &config.legacy_id_prefix))
                .or_default()
                .push(row);
        }
    }
    let repeated = by_id.values().filter(|rows| rows.len() > 1).count();
    if repeated > 0 {
        warn!(repeated, "Primary export repeats legacy ids; each copy is migrated");
    }

    let mut outcome = MergeOutcome::default();
    let mut matched_ids = BTreeSet::new();
    let mut matched_crossref = 0;
    for (entry, xref) in &entries {
        let Some(rows) = by_id.get(&entry.legacy_id) else { continue };
        matched_ids.insert(entry.legacy_id.as_str());
        matched_crossref += 1;
        for row in rows {
            let mut merged = (*xref).clone();
            merged.overlay(row);
            outcome.records.push(merged);
        }
    }
    outcome.unmatched_crossref = crossref.rows.len() - matched_crossref;
    outcome.unmatched_primary = primary.rows.len()
        - by_id
            .iter()
            .filter(|(id, _)| matched_ids.contains(id.as_str()))
            .map(|(_, rows)| rows.len())
            .sum::<usize>();

    info!(
        merged = outcome.records.len(),
        unmatched_primary = outcome.unmatched_primary,
        unmatched_crossref = outcome.unmatched_crossref,
        "Joined primary export with cross-reference list"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|cells| Record::from_cells(headers.iter().copied().zip(cells.iter().copied())))
                .collect(),
        }
    }

    fn primary() -> RawTable {
        table(
            &["Catalog #", "County"],
            &[&["GRSM  102763", "Blount"], &["GRSM 500", "Sevier"], &["GRSM 77", "Swain"]],
        )
    }

    #[test]
    fn test_normalize_legacy_id() {
        assert_eq!(normalize_legacy_id("GRSM  102763 ", "GRSM"), "102763");
        assert_eq!(normalize_legacy_id(" 102763", "GRSM"), "102763");
        assert_eq!(normalize_legacy_id("GRSM 1", ""), "GRSM 1");
    }

    #[test]
    fn test_inner_join_in_crossref_order() {
        let crossref = table(
            &["GSMNP (number only)", "SERNEC"],
            &[&["77", "GSMNP00077"], &["999", "GSMNP00999"], &["102763", "GSMNP00030"]],
        );

        let outcome = merge_tables(&primary(), &crossref, &MergeConfig::default()).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].text("County"), Some("Swain"));
        assert_eq!(outcome.records[1].text("SERNEC"), Some("GSMNP00030"));
        assert_eq!(outcome.records[1].text("Catalog #"), Some("GRSM  102763"));
        assert_eq!(outcome.unmatched_crossref, 1);
        assert_eq!(outcome.unmatched_primary, 1);
    }

    #[test]
    fn test_duplicate_crossref_is_fatal() {
        let crossref = table(
            &["GSMNP (number only)", "SERNEC"],
            &[&["77", "A"], &["GRSM 77", "B"], &["5", "C"], &["5", "D"], &["6", "E"]],
        );

        let err = merge_tables(&primary(), &crossref, &MergeConfig::default()).unwrap_err();

        match err {
            MigrationError::DuplicateCrossReference { ids } => assert_eq!(ids, vec!["5", "77"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_join_column() {
        let crossref = table(&["SERNEC"], &[&["A"]]);
        let err = merge_tables(&primary(), &crossref, &MergeConfig::default()).unwrap_err();
        assert!(matches!(err, MigrationError::MissingColumn { column, .. } if column == "GSMNP (number only)"));
    }

    #[test]
    fn test_entries_carry_target_id() {
        let crossref = table(&["GSMNP (number only)", "SERNEC"], &[&["102763", "GSMNP00030"]]);
        let entries = cross_reference_entries(&crossref, &MergeConfig::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].0,
            CrossReferenceEntry { legacy_id: "102763".into(), target_id: "GSMNP00030".into() }
        );
    }

    #[test]
    fn test_join_driven_by_validated_entries() {
        let crossref = table(
            &["GSMNP (number only)", "SERNEC"],
            &[&["", "GSMNP00000"], &["GRSM 500", "GSMNP00050"], &["102763", "GSMNP00030"]],
        );

        let outcome = merge_tables(&primary(), &crossref, &MergeConfig::default()).unwrap();

        let targets: Vec<_> = outcome.records.iter().map(|r| r.text("SERNEC")).collect();
        assert_eq!(targets, vec![Some("GSMNP00050"), Some("GSMNP00030")]);
        assert_eq!(outcome.unmatched_crossref, 1);
        assert_eq!(outcome.unmatched_primary, 1);
    }
}
