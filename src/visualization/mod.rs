//! Shape preview for reordered cross-sections.
//!
//! Renders the reordered points as a PNG: grey axes through the origin, a
//! polyline following the output order, ordinary points in blue and the
//! start point in red. The view keeps a 1:1 aspect so the profile is not
//! distorted. No text is drawn.

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::processors::reorder::{extract_points, FieldSelection, Point, PointRole, ReorderError, ReorderOutcome};

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Cannot read coordinates: {0}")]
    Coordinates(#[from] ReorderError),

    #[error("Empty table")]
    EmptyTable,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

const AXIS_COLOR: RGBColor = RGBColor(160, 160, 160);
const PATH_COLOR: RGBColor = RGBColor(100, 149, 237);
const POINT_COLOR: RGBColor = RGBColor(0, 0, 255);
const START_COLOR: RGBColor = RGBColor(255, 0, 0);

/// Plot the reordered cross-section and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `outcome` - Reordered table; row 0 is drawn as the start point
/// * `fields` - Coordinate columns used for the reorder
/// * `config` - Image size and marker radii
pub fn plot_section(
    output_path: &Path,
    outcome: &ReorderOutcome,
    fields: &FieldSelection,
    config: &PlotConfig,
) -> Result<()> {
    if outcome.table.is_empty() {
        return Err(VisualizationError::EmptyTable);
    }

    let points = extract_points(&outcome.table, fields)?;
    let (x_range, y_range) = square_bounds(&points, config.width, config.height);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // Axes through the origin
    chart
        .draw_series(LineSeries::new(
            vec![(x_range.start, 0.0), (x_range.end, 0.0)],
            &AXIS_COLOR,
        ))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, y_range.start), (0.0, y_range.end)],
            &AXIS_COLOR,
        ))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // Traversal order
    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.x, p.y)),
            PATH_COLOR.stroke_width(2),
        ))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(
            points
                .iter()
                .enumerate()
                .filter(|(i, _)| outcome.role(*i) == PointRole::Other)
                .map(|(_, p)| Circle::new((p.x, p.y), config.point_radius, POINT_COLOR.filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let start = points[0];
    chart
        .draw_series(std::iter::once(Circle::new(
            (start.x, start.y),
            config.start_radius,
            START_COLOR.filled(),
        )))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    log::info!("Plot -> {}", output_path.display());
    Ok(())
}

/// Equal-scale view ranges around the points and the origin, stretched to
/// the image aspect ratio.
fn square_bounds(points: &[Point], width: u32, height: u32) -> (Range<f64>, Range<f64>) {
    let mut x_min = 0.0f64;
    let mut x_max = 0.0f64;
    let mut y_min = 0.0f64;
    let mut y_max = 0.0f64;

    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    let cx = (x_min + x_max) / 2.0;
    let cy = (y_min + y_max) / 2.0;
    let mut half = (x_max - x_min).max(y_max - y_min) / 2.0 * 1.05;
    if half < f64::EPSILON {
        half = 1.0;
    }

    let aspect = width.max(1) as f64 / height.max(1) as f64;
    let half_x = half * aspect.max(1.0);
    let half_y = half * (1.0 / aspect).max(1.0);

    ((cx - half_x)..(cx + half_x), (cy - half_y)..(cy + half_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReorderConfig;
    use crate::core::table::Table;
    use crate::processors::reorder::reorder;
    use tempfile::tempdir;

    fn outcome() -> ReorderOutcome {
        let table = Table::from_rows(
            &["node", "x", "y"],
            &[
                vec!["1", "1", "1"],
                vec!["2", "-1", "-1"],
                vec!["3", "-2", "-0.5"],
                vec!["4", "1", "-1"],
            ],
        );
        reorder(&table, &FieldSelection::new("x", "y"), &ReorderConfig::default()).unwrap()
    }

    #[test]
    fn test_square_bounds_equal_aspect() {
        let points = vec![Point::new(-2.0, -1.0), Point::new(4.0, 1.0)];
        let (xr, yr) = square_bounds(&points, 100, 100);
        let xs = xr.end - xr.start;
        let ys = yr.end - yr.start;
        assert!((xs - ys).abs() < 1e-9);
        assert!(xr.start <= -2.0 && xr.end >= 4.0);
        assert!(yr.start <= -1.0 && yr.end >= 1.0);
    }

    #[test]
    fn test_square_bounds_wide_image() {
        let points = vec![Point::new(-1.0, -1.0), Point::new(1.0, 1.0)];
        let (xr, yr) = square_bounds(&points, 200, 100);
        assert!(((xr.end - xr.start) / (yr.end - yr.start) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_bounds_degenerate() {
        let (xr, yr) = square_bounds(&[Point::new(0.0, 0.0)], 10, 10);
        assert_eq!(xr, -1.0..1.0);
        assert_eq!(yr, -1.0..1.0);
    }

    #[test]
    fn test_plot_section_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plots").join("section.png");
        let config = PlotConfig {
            width: 200,
            height: 200,
            ..PlotConfig::default()
        };

        plot_section(&path, &outcome(), &FieldSelection::new("x", "y"), &config).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_section_bad_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("section.png");
        let err = plot_section(
            &path,
            &outcome(),
            &FieldSelection::new("x", "z"),
            &PlotConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VisualizationError::Coordinates(_)));
    }
}
