use tracing::instrument;

use crate::config::MappingEntry;
use crate::constants;
use crate::types::{FieldValue, OutputTable, Record};

/// Rename mapped source fields to their target names. Unmapped fields stay put
/// so the derivers can still read them; projection drops them later.
pub fn rename_fields(records: &mut [Record], mapping: &[MappingEntry]) {
    for record in records.iter_mut() {
        // Take every mapped value out first so a target that shares a name
        // with another source column cannot be clobbered mid-rename
        let moved: Vec<(&str, Option<FieldValue>)> = mapping
            .iter()
            .map(|entry| (entry.target.as_str(), record.remove(&entry.source)))
            .collect();
        for (target, value) in moved {
            if let Some(value) = value {
                record.set(target, value);
            }
        }
    }
}

/// Mapped target fields in mapping order, then the derived fields.
pub fn output_columns(mapping: &[MappingEntry]) -> Vec<String> {
    mapping
        .iter()
        .map(|entry| entry.target.clone())
        .chain(constants::DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// Reduce every record to exactly the output columns.
#[instrument(skip_all, fields(records = records.len()))]
pub fn project(records: Vec<Record>, mapping: &[MappingEntry]) -> OutputTable {
    let columns = output_columns(mapping);
    let rows = records
        .into_iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).cloned().unwrap_or(FieldValue::Missing))
                .collect()
        })
        .collect();
    OutputTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> Vec<MappingEntry> {
        pairs
            .iter()
            .map(|(s, t)| MappingEntry { source: s.to_string(), target: t.to_string() })
            .collect()
    }

    #[test]
    fn test_rename_keeps_unmapped_until_projection() {
        let mapping = mapping(&[("County", "county"), ("Sex", "sex")]);
        let mut records = vec![Record::from_cells(vec![("County", "Blount"), ("Age/Stage", "adult")])];

        rename_fields(&mut records, &mapping);

        assert_eq!(records[0].text("county"), Some("Blount"));
        assert!(records[0].get("County").is_none());
        assert_eq!(records[0].text("Age/Stage"), Some("adult"));
    }

    #[test]
    fn test_rename_swapped_names() {
        let mapping = mapping(&[("a", "b"), ("b", "a")]);
        let mut records = vec![Record::from_cells(vec![("a", "1"), ("b", "2")])];

        rename_fields(&mut records, &mapping);

        assert_eq!(records[0].text("a"), Some("2"));
        assert_eq!(records[0].text("b"), Some("1"));
    }

    #[test]
    fn test_project_exact_columns() {
        let mapping = mapping(&[("County", "county")]);
        let mut record = Record::from_cells(vec![("county", "Blount"), ("Age/Stage", "adult")]);
        record.set("decimalLatitude", FieldValue::Number(35.62));

        let table = project(vec![record], &mapping);

        assert_eq!(
            table.columns,
            vec!["county", "lifeStage", "decimalLatitude", "decimalLongitude", "verbatimCoordinates"]
        );
        assert_eq!(
            table.rows[0],
            vec![
                FieldValue::text("Blount"),
                FieldValue::Missing,
                FieldValue::Number(35.62),
                FieldValue::Missing,
                FieldValue::Missing,
            ]
        );
    }
}
