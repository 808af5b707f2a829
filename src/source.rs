use crate::models::{Row, Table};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads a CSV file into a [`Table`]; the first non-empty row is the header.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let table = read_table_from(BufReader::new(file))
        .with_context(|| format!("Failed to read CSV from: {}", path.display()))?;
    info!(
        path = %path.display(),
        columns = table.header.len(),
        rows = table.rows.len(),
        "Input loaded"
    );
    Ok(table)
}

/// Parses CSV from any reader. Every record must have the same field count.
///
/// Fields are read as bytes; invalid UTF-8 sequences become U+FFFD instead
/// of failing the record.
pub fn read_table_from<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = ReaderBuilder::new().has_headers(false).from_reader(reader);

    let mut rows = Vec::new();
    let mut lossy_fields = 0u64;
    for (line, result) in csv_reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let row: Row = record
            .iter()
            .map(|field| match String::from_utf8_lossy(field) {
                Cow::Borrowed(s) => s.to_string(),
                Cow::Owned(s) => {
                    lossy_fields += 1;
                    s
                }
            })
            .collect();
        rows.push(row);
    }
    if lossy_fields > 0 {
        warn!(
            fields = lossy_fields,
            "Replaced invalid UTF-8 in input fields with U+FFFD"
        );
    }

    let before = rows.len();
    let mut rows = filter_empty(rows).into_iter();
    debug!(dropped = before - rows.len(), "Filtered empty rows");

    let header = rows.next().context("Input contains no rows")?;
    Ok(Table {
        header,
        rows: rows.collect(),
    })
}

/// Drops rows with zero fields.
pub fn filter_empty(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter().filter(|r| !r.is_empty()).collect()
}
