//! Clockwise reordering of cross-section points.
//!
//! Points are sorted by polar angle around the origin from π down to −π
//! (clockwise on an x-right/y-up plot), then rotated so the sequence starts
//! at the third-quadrant point nearest the Y axis. "Nearest" means the
//! largest x among points with `x < 0 && y < 0`, not a distance.
//!
//! The angle is only used while sorting; the output table has exactly the
//! input columns and records, in a new order.

use std::fmt;

use thiserror::Error;

use crate::config::ReorderConfig;
use crate::core::table::{Table, Value};

/// Which columns supply the geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub x: String,
    pub y: String,
}

impl FieldSelection {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// The geometric pair taken from one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Polar angle in (−π, π]. The origin maps to 0.
    #[inline]
    pub fn theta(&self) -> f64 {
        // +0.0 folds -0.0 into +0.0, keeping -π out of the range
        (self.y + 0.0).atan2(self.x + 0.0)
    }

    /// Strictly inside the third quadrant (`x < 0` and `y < 0`).
    #[inline]
    pub fn in_third_quadrant(&self) -> bool {
        self.x < 0.0 && self.y < 0.0
    }
}

/// Why a coordinate column could not be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldProblem {
    #[error("column not found")]
    MissingColumn,

    #[error("row {row} has no value")]
    MissingValue { row: usize },

    #[error("row {row} value '{value}' is not numeric")]
    NotNumeric { row: usize, value: String },

    #[error("row {row} value '{value}' is not finite")]
    NotFinite { row: usize, value: String },
}

/// Fatal reordering errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReorderError {
    #[error("No points to reorder")]
    EmptyInput,

    #[error("Invalid coordinate field '{field}': {problem}")]
    InvalidField {
        field: String,
        problem: FieldProblem,
    },

    #[error("Too many points: {count} exceeds the limit of {max}")]
    TooManyPoints { count: usize, max: usize },
}

/// Non-fatal conditions reported alongside a valid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderWarning {
    /// No point has both x < 0 and y < 0; the clockwise order is used
    /// without rotation.
    NoThirdQuadrantPoint,
}

impl fmt::Display for ReorderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReorderWarning::NoThirdQuadrantPoint => f.write_str(
                "no point lies in the third quadrant (x < 0, y < 0); \
                 clockwise order kept with an unchanged start point",
            ),
        }
    }
}

/// Display role of an output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointRole {
    Start,
    Other,
}

impl PointRole {
    pub fn label(self) -> &'static str {
        match self {
            PointRole::Start => "Start Point (New Node 1)",
            PointRole::Other => "Other Points",
        }
    }
}

/// Permutation produced by [`clockwise_order`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reordering {
    /// Input indices in output order.
    pub order: Vec<usize>,
    /// Position of the start point in the angle-sorted sequence before the
    /// rotation.
    pub start_index: usize,
    pub warning: Option<ReorderWarning>,
}

/// A reordered table plus the metadata callers display.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderOutcome {
    /// Same columns as the input, rows in canonical order.
    pub table: Table,
    /// Input row index of each output row.
    pub source_rows: Vec<usize>,
    /// Position of the start point in the angle-sorted sequence.
    pub start_index: usize,
    /// Input row index of the start point.
    pub start_source_row: usize,
    pub warning: Option<ReorderWarning>,
}

impl ReorderOutcome {
    /// Role of the output row at `index`. Only row 0 is the start.
    #[inline]
    pub fn role(&self, index: usize) -> PointRole {
        if index == 0 {
            PointRole::Start
        } else {
            PointRole::Other
        }
    }

    /// Roles for every output row, in order.
    pub fn roles(&self) -> Vec<PointRole> {
        (0..self.table.len()).map(|i| self.role(i)).collect()
    }
}

/// Read the selected coordinate pair from every record.
///
/// Fails on the first record whose x or y cell is missing, non-numeric or
/// non-finite. Rows in errors are 1-based data rows.
pub fn extract_points(table: &Table, fields: &FieldSelection) -> Result<Vec<Point>, ReorderError> {
    let x_idx = column_of(table, &fields.x)?;
    let y_idx = column_of(table, &fields.y)?;

    table
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let row = i + 1;
            let x = coordinate(record.get(x_idx), &fields.x, row)?;
            let y = coordinate(record.get(y_idx), &fields.y, row)?;
            Ok(Point::new(x, y))
        })
        .collect()
}

fn column_of(table: &Table, field: &str) -> Result<usize, ReorderError> {
    table
        .column_index(field)
        .ok_or_else(|| ReorderError::InvalidField {
            field: field.to_string(),
            problem: FieldProblem::MissingColumn,
        })
}

fn coordinate(value: Option<&Value>, field: &str, row: usize) -> Result<f64, ReorderError> {
    let invalid = |problem| ReorderError::InvalidField {
        field: field.to_string(),
        problem,
    };

    match value {
        None | Some(Value::Empty) => Err(invalid(FieldProblem::MissingValue { row })),
        Some(Value::Text(text)) => Err(invalid(FieldProblem::NotNumeric {
            row,
            value: text.clone(),
        })),
        Some(Value::Number { value, raw }) => {
            if value.is_finite() {
                Ok(*value)
            } else {
                Err(invalid(FieldProblem::NotFinite {
                    row,
                    value: raw.clone(),
                }))
            }
        }
    }
}

/// Compute the canonical clockwise permutation of `points`.
///
/// 1. Stable sort by `theta` descending; equal angles keep input order.
/// 2. Among third-quadrant points pick the largest x; ties go to the first
///    one in sorted order.
/// 3. Rotate the sorted sequence left so that point comes first.
///
/// Without a third-quadrant point the sorted order is returned unrotated
/// together with [`ReorderWarning::NoThirdQuadrantPoint`].
pub fn clockwise_order(points: &[Point]) -> Result<Reordering, ReorderError> {
    if points.is_empty() {
        return Err(ReorderError::EmptyInput);
    }

    let thetas: Vec<f64> = points.iter().map(Point::theta).collect();
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| thetas[b].total_cmp(&thetas[a]));

    let mut best: Option<(usize, f64)> = None;
    for (pos, &i) in order.iter().enumerate() {
        let p = points[i];
        if !p.in_third_quadrant() {
            continue;
        }
        match best {
            Some((_, best_x)) if p.x <= best_x => {}
            _ => best = Some((pos, p.x)),
        }
    }

    let (start_index, warning) = match best {
        Some((pos, _)) => (pos, None),
        None => (0, Some(ReorderWarning::NoThirdQuadrantPoint)),
    };

    order.rotate_left(start_index);

    Ok(Reordering {
        order,
        start_index,
        warning,
    })
}

/// Reorder the records of `table` using the selected coordinate columns.
///
/// The input table is not modified.
///
/// # Errors
///
/// * [`ReorderError::EmptyInput`] when the table has no records
/// * [`ReorderError::TooManyPoints`] when it exceeds `config.max_points`
/// * [`ReorderError::InvalidField`] when a coordinate is unusable
pub fn reorder(
    table: &Table,
    fields: &FieldSelection,
    config: &ReorderConfig,
) -> Result<ReorderOutcome, ReorderError> {
    if table.is_empty() {
        return Err(ReorderError::EmptyInput);
    }
    if table.len() > config.max_points {
        return Err(ReorderError::TooManyPoints {
            count: table.len(),
            max: config.max_points,
        });
    }

    let points = extract_points(table, fields)?;
    let Reordering {
        order,
        start_index,
        warning,
    } = clockwise_order(&points)?;

    let start_source_row = order[0];
    log::debug!(
        "Reordered {} points by ({}, {}): start row {} at sorted position {}",
        points.len(),
        fields.x,
        fields.y,
        start_source_row,
        start_index
    );

    Ok(ReorderOutcome {
        table: table.select_rows(&order),
        source_rows: order,
        start_index,
        start_source_row,
        warning,
    })
}
