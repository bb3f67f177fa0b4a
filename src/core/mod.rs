//! Core data types and I/O operations.

pub mod loaders;
pub mod timeline;
pub mod writers;

pub use loaders::{DataTable, LoaderError};
pub use writers::{
    write_aligned_csv, write_column_stats_csv, write_histogram_csv, SeriesSlice, WriteError,
};
