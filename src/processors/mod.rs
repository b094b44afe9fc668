//! Data processing modules.

pub mod columns;
pub mod pipeline;
pub mod reorder;

// Re-export key types for convenience
pub use columns::{guess_coordinate_fields, resolve_fields};
pub use pipeline::{
    batch_targets, export_outcome, find_input_files, reorder_directory, reorder_file, BatchEntry,
    FileReport, PipelineError,
};
pub use reorder::{
    clockwise_order, extract_points, reorder, FieldProblem, FieldSelection, Point, PointRole,
    ReorderError, ReorderOutcome, ReorderWarning, Reordering,
};
