//! Data writers for reordered tables.
//!
//! Tables are written as comma-separated (`.csv`) or tab-separated (`.txt`)
//! text. The header is the input column list and every cell is written
//! exactly as it was loaded.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::table::Table;
use crate::config::ExportFormat;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to flush data to the destination.
    #[error("failed to write to '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Serialize `table` into any writer.
///
/// `label` only appears in error messages.
pub fn write_delimited<W: Write>(
    writer: W,
    table: &Table,
    format: ExportFormat,
    label: &str,
) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    csv_writer
        .write_record(&table.columns)
        .map_err(|e| WriteError::CsvError {
            path: label.to_string(),
            source: e,
        })?;

    for record in &table.records {
        csv_writer
            .write_record(record.texts())
            .map_err(|e| WriteError::CsvError {
                path: label.to_string(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: label.to_string(),
        source: e,
    })?;

    Ok(())
}

/// Write a table to `path` in the given format.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `table` - Table to write
/// * `format` - `Csv` for comma-separated, `Txt` for tab-separated
///
/// # Example
///
/// ```no_run
/// use tunnel_reorder::config::ExportFormat;
/// use tunnel_reorder::core::table::Table;
/// use tunnel_reorder::core::writers::write_table;
/// use std::path::Path;
///
/// let table = Table::from_rows(&["x", "y"], &[vec!["1.0", "2.0"]]);
/// write_table(Path::new("sorted.csv"), &table, ExportFormat::Csv).unwrap();
/// ```
pub fn write_table(path: &Path, table: &Table, format: ExportFormat) -> Result<()> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;

    write_delimited(
        BufWriter::new(file),
        table,
        format,
        &path.display().to_string(),
    )
}

/// Render a table to a string, for previews and in-memory downloads.
pub fn table_to_string(table: &Table, format: ExportFormat) -> Result<String> {
    let mut buf = Vec::new();
    write_delimited(&mut buf, table, format, "<memory>")?;
    // csv only ever writes the UTF-8 text it was handed
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
