//! Core data types and I/O operations.

pub mod loaders;
pub mod table;
pub mod writers;

pub use loaders::{duplicate_columns, load_table, parse_table, LoaderError};
pub use table::{Record, Table, Value};
pub use writers::{table_to_string, write_table, WriteError};
