//! Loaders for delimited survey point tables.
//!
//! Input files are plain text with a header row followed by one row per
//! point. Comma-separated, tab-separated and whitespace-aligned layouts are
//! supported; with [`Delimiter::Auto`] the separator is sniffed from the
//! content.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use super::table::{Record, Table, Value};
use crate::config::{Delimiter, LoaderConfig};

/// Errors that can occur during table loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing header row")]
    MissingHeader,

    #[error("Row {row} has {found} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Pick a concrete separator for `content`.
///
/// Comma wins whenever one appears anywhere in the text; otherwise columns
/// are split on whitespace.
pub fn sniff_delimiter(content: &str) -> Delimiter {
    if content.contains(',') {
        Delimiter::Comma
    } else {
        Delimiter::Whitespace
    }
}

/// Load a point table from a file.
///
/// # Arguments
///
/// * `path` - Path to the CSV/TXT file (UTF-8)
/// * `config` - Loader configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, has no header, or a row
/// does not match the header width.
pub fn load_table<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Table> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let table = parse_table(&content, config.delimiter)?;
    log::debug!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Parse a point table from text.
///
/// Header names are trimmed. Text cells keep surrounding whitespace so they
/// export unchanged. A header-only input yields an empty table; rejecting
/// that is left to the caller.
///
/// Duplicate header names are kept and logged with `warn!`. Lookups by
/// name resolve to the first of them.
pub fn parse_table(content: &str, delimiter: Delimiter) -> Result<Table> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let delimiter = match delimiter {
        Delimiter::Auto => sniff_delimiter(content),
        other => other,
    };

    let table = match delimiter {
        Delimiter::Comma => parse_delimited(content, b',')?,
        Delimiter::Tab => parse_delimited(content, b'\t')?,
        Delimiter::Whitespace | Delimiter::Auto => parse_whitespace(content)?,
    };

    let duplicates = duplicate_columns(&table.columns);
    if !duplicates.is_empty() {
        log::warn!(
            "Duplicate column names {:?}; only the first of each can be selected",
            duplicates
        );
    }

    Ok(table)
}

/// Header names that occur more than once, in first-repeat order.
pub fn duplicate_columns(columns: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for name in columns {
        if !seen.insert(name.as_str()) && !duplicates.contains(&name.as_str()) {
            duplicates.push(name.as_str());
        }
    }
    duplicates
}

fn parse_delimited(content: &str, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoaderError::MissingHeader);
    }

    let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());
    let expected = table.columns.len();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != expected {
            return Err(LoaderError::RaggedRow {
                row: i + 1,
                expected,
                found: record.len(),
            });
        }
        table.push(Record::new(record.iter().map(Value::parse).collect()));
    }

    Ok(table)
}

fn parse_whitespace(content: &str) -> Result<Table> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or(LoaderError::MissingHeader)?;
    let mut table = Table::new(header.split_whitespace().map(str::to_string).collect());
    let expected = table.columns.len();

    for (i, line) in lines.enumerate() {
        let values: Vec<Value> = line.split_whitespace().map(Value::parse).collect();
        if values.len() != expected {
            return Err(LoaderError::RaggedRow {
                row: i + 1,
                expected,
                found: values.len(),
            });
        }
        table.push(Record::new(values));
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("x,y\n1,2\n"), Delimiter::Comma);
        assert_eq!(sniff_delimiter("x\ty\n1\t2\n"), Delimiter::Whitespace);
        assert_eq!(sniff_delimiter("x y\n1 2\n"), Delimiter::Whitespace);
    }

    #[test]
    fn test_parse_comma_table() -> Result<()> {
        let table = parse_table(" node , x1 , y1 \n1,-1.5,2.0\n2,3,-4\n", Delimiter::Auto)?;
        assert_eq!(table.columns, vec!["node", "x1", "y1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "x1").and_then(Value::as_f64), Some(-1.5));
        assert_eq!(table.value(1, "y1").map(Value::as_str), Some("-4"));
        Ok(())
    }

    #[test]
    fn test_parse_whitespace_table() -> Result<()> {
        let content = "node\tx   y\n\n1\t0.5   -0.5\n2  1.0\t1.0\n";
        let table = parse_table(content, Delimiter::Auto)?;
        assert_eq!(table.columns, vec!["node", "x", "y"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "x").and_then(Value::as_f64), Some(1.0));
        Ok(())
    }

    #[test]
    fn test_parse_explicit_tab_keeps_empty_cells() -> Result<()> {
        let table = parse_table("a\tb\tc\n1\t\t3\n", Delimiter::Tab)?;
        assert_eq!(table.value(0, "b"), Some(&Value::Empty));
        Ok(())
    }

    #[test]
    fn test_parse_keeps_text_whitespace() -> Result<()> {
        let table = parse_table("node,x,y,note\n1, 2.5 ,3, near portal \n", Delimiter::Comma)?;
        assert_eq!(table.value(0, "note").map(Value::as_str), Some(" near portal "));
        assert_eq!(table.value(0, "x").and_then(Value::as_f64), Some(2.5));
        assert_eq!(table.value(0, "x").map(Value::as_str), Some("2.5"));
        Ok(())
    }

    #[test]
    fn test_duplicate_columns() -> Result<()> {
        let table = parse_table("x,y,x,y,x\n1,2,3,4,5\n", Delimiter::Comma)?;
        assert_eq!(duplicate_columns(&table.columns), vec!["x", "y"]);
        assert_eq!(table.value(0, "x").and_then(Value::as_f64), Some(1.0));

        let unique = vec!["x".to_string(), "y".to_string()];
        assert!(duplicate_columns(&unique).is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_strips_bom() -> Result<()> {
        let table = parse_table("\u{feff}x,y\n1,2\n", Delimiter::Auto)?;
        assert_eq!(table.columns[0], "x");
        Ok(())
    }

    #[test]
    fn test_header_only_is_empty_table() -> Result<()> {
        let table = parse_table("x,y\n", Delimiter::Auto)?;
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse_table("", Delimiter::Auto),
            Err(LoaderError::MissingHeader)
        ));
        assert!(matches!(
            parse_table("  \n\n", Delimiter::Whitespace),
            Err(LoaderError::MissingHeader)
        ));
    }

    #[test]
    fn test_ragged_row() {
        let err = parse_table("x,y\n1,2\n3\n", Delimiter::Comma).unwrap_err();
        match err {
            LoaderError::RaggedRow {
                row,
                expected,
                found,
            } => {
                assert_eq!(row, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected RaggedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_load_table() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "node,x,y,value1").unwrap();
        writeln!(file, "1,1.0,2.0,10").unwrap();
        writeln!(file, "2,-1.0,-2.0,20").unwrap();
        file.flush().unwrap();

        let table = load_table(file.path(), &LoaderConfig::default())?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.value(1, "value1").map(Value::as_str), Some("20"));
        Ok(())
    }
}
