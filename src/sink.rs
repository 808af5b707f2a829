use crate::config::WRITER_BUFFER_CAPACITY;
use crate::models::ResultMatrix;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes the matrix to `path`, creating or truncating the file.
///
/// Returns the number of records written.
pub fn write_matrix(path: impl AsRef<Path>, matrix: &ResultMatrix) -> Result<u64> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let written = write_matrix_to(BufWriter::with_capacity(WRITER_BUFFER_CAPACITY, file), matrix)
        .with_context(|| format!("Failed to write CSV to: {}", path.display()))?;
    info!(path = %path.display(), rows = written, "Output written");
    Ok(written)
}

/// Serializes the matrix to any writer, skipping rows with no fields.
pub fn write_matrix_to<W: Write>(writer: W, matrix: &ResultMatrix) -> Result<u64> {
    let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(writer);
    let mut written = 0u64;
    for row in matrix.iter().filter(|r| !r.is_empty()) {
        csv_writer.write_record(row)?;
        written += 1;
    }
    csv_writer.flush()?;
    Ok(written)
}
