//! In-memory tabular data.
//!
//! A [`Table`] is an ordered header plus ordered records. Every cell keeps
//! the exact text it was loaded from, so writing a table back out never
//! re-rounds or reformats numbers.

use std::collections::HashMap;
use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric cell with the text it was parsed from.
    Number { value: f64, raw: String },
    /// Any non-numeric text.
    Text(String),
    /// Empty cell.
    Empty,
}

impl Value {
    /// Classify a raw cell. Surrounding whitespace is ignored for parsing.
    /// Numbers are written back as their trimmed token; text keeps every
    /// character it was loaded with.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Value::Number {
                value,
                raw: trimmed.to_string(),
            },
            Err(_) => Value::Text(raw.to_string()),
        }
    }

    /// Numeric value, if this cell holds one.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Text as it will be exported.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Number { raw, .. } => raw,
            Value::Text(text) => text,
            Value::Empty => "",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number {
            value,
            raw: value.to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::parse(raw)
    }
}

/// One row of a table. Cells are positional and line up with the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cells as exported text, in column order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(Value::as_str)
    }
}

/// Ordered header plus ordered records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in their original order.
    pub columns: Vec<String>,
    /// Data rows in their current order.
    pub records: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Creates a table from a header and rows of raw cell text.
    pub fn from_rows<S: AsRef<str>>(columns: &[&str], rows: &[Vec<S>]) -> Self {
        let records = rows
            .iter()
            .map(|row| Record::new(row.iter().map(|c| Value::parse(c.as_ref())).collect()))
            .collect();
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            records,
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of data rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Map of column name to position. Later duplicates do not shadow
    /// earlier columns.
    pub fn column_map(&self) -> HashMap<&str, usize> {
        let mut map = HashMap::with_capacity(self.columns.len());
        for (i, name) in self.columns.iter().enumerate() {
            map.entry(name.as_str()).or_insert(i);
        }
        map
    }

    /// Cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.records.get(row)?.get(idx)
    }

    /// New table with the same header and rows taken in `order`.
    ///
    /// `order` holds row indices into `self`; each index is cloned once.
    pub fn select_rows(&self, order: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            records: order.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }
}
