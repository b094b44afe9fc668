//! Canonical ordering of tunnel cross-section survey points.
//!
//! This crate provides tools for:
//! - Loading delimited point tables (comma, tab or whitespace separated)
//! - Reordering points clockwise around the origin, starting from the
//!   third-quadrant point nearest the Y axis
//! - Exporting the reordered table as CSV/TXT and previewing it as a PNG
//!
//! # Example
//!
//! ```no_run
//! use tunnel_reorder::config::{LoaderConfig, ReorderConfig};
//! use tunnel_reorder::core::loaders::load_table;
//! use tunnel_reorder::processors::reorder::{reorder, FieldSelection};
//!
//! let table = load_table("section.csv", &LoaderConfig::default()).unwrap();
//! let outcome = reorder(&table, &FieldSelection::new("x1", "y1"), &ReorderConfig::default()).unwrap();
//! println!("start row: {}", outcome.start_source_row);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{Delimiter, ExportConfig, ExportFormat, LoaderConfig, PipelineConfig, PlotConfig, ReorderConfig};
pub use core::table::{Record, Table, Value};
pub use processors::reorder::{reorder, FieldSelection, ReorderError, ReorderOutcome, ReorderWarning};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
