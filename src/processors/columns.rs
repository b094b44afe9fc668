//! Coordinate column selection.

use super::reorder::FieldSelection;
use crate::config::ReorderConfig;

fn find_named<'a>(columns: &'a [String], names: &[&str]) -> Option<&'a String> {
    names
        .iter()
        .find_map(|name| columns.iter().find(|c| c.eq_ignore_ascii_case(name)))
}

/// Guess which columns hold the coordinate pair.
///
/// x prefers `x1`, then `x`, then the second column. y prefers `y1`, then
/// `y2`, then `y`, then the third column. Narrow tables fall back to the
/// first column. Names match case-insensitively.
///
/// Returns `None` for an empty header.
pub fn guess_coordinate_fields(columns: &[String]) -> Option<FieldSelection> {
    let first = columns.first()?;

    let x = find_named(columns, &["x1", "x"])
        .or_else(|| columns.get(1))
        .unwrap_or(first);
    let y = find_named(columns, &["y1", "y2", "y"])
        .or_else(|| columns.get(2))
        .unwrap_or(first);

    Some(FieldSelection::new(x.clone(), y.clone()))
}

/// Settle the coordinate pair from explicit choices, config, and the header.
///
/// Each axis is resolved independently: an explicit name wins, then the
/// configured one, then the guess. `None` only when a guess was needed and
/// the header is empty.
pub fn resolve_fields(
    columns: &[String],
    x_override: Option<&str>,
    y_override: Option<&str>,
    config: &ReorderConfig,
) -> Option<FieldSelection> {
    let x = x_override.or(config.x_field.as_deref());
    let y = y_override.or(config.y_field.as_deref());

    if let (Some(x), Some(y)) = (x, y) {
        return Some(FieldSelection::new(x, y));
    }

    let guess = guess_coordinate_fields(columns)?;
    Some(FieldSelection {
        x: x.map(str::to_string).unwrap_or(guess.x),
        y: y.map(str::to_string).unwrap_or(guess.y),
    })
}
