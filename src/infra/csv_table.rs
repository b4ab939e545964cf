use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::types::{OutputTable, Record, RawTable};

/// Read a delimited file wholesale; every cell is kept as text.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path)?;
    let table = read_table_from(file)?;
    debug!(path = %path.display(), rows = table.rows.len(), "Loaded table");
    Ok(table)
}

pub fn read_table_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true) // ragged spreadsheet exports are common
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(Record::from_cells(
            headers.iter().map(String::as_str).zip(record.iter()),
        ));
    }

    Ok(RawTable { headers, rows })
}

/// Write the projected table as UTF-8 CSV with a header row.
pub fn write_table(path: &Path, table: &OutputTable) -> Result<()> {
    let file = File::create(path)?;
    write_table_to(file, table)
}

pub fn write_table_to<W: Write>(writer: W, table: &OutputTable) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    #[test]
    fn test_read_table_trims_and_drops_blanks() {
        let data = "Catalog #,Sex,County\nGRSM  102763 , ,Blount\nGRSM 9,male\n";
        let table = read_table_from(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Catalog #", "Sex", "County"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].text("Catalog #"), Some("GRSM  102763"));
        assert!(table.rows[0].get("Sex").is_none());
        assert_eq!(table.rows[1].text("Sex"), Some("male"));
        assert!(table.rows[1].get("County").is_none());
    }

    #[test]
    fn test_write_table() {
        let table = OutputTable {
            columns: vec!["catalogNumber".into(), "decimalLongitude".into(), "locality".into()],
            rows: vec![vec![
                FieldValue::text("GSMNP00030"),
                FieldValue::Number(-83.5),
                FieldValue::text("Cades Cove, Tennessee"),
            ]],
        };
        let mut out = Vec::new();
        write_table_to(&mut out, &table).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "catalogNumber,decimalLongitude,locality\nGSMNP00030,-83.5,\"Cades Cove, Tennessee\"\n"
        );
    }
}
