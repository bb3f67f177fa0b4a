//! Configuration-driven comparison of sampled CSV data.
//!
//! This crate provides tools for:
//! - Loading numeric sensor/log CSV files and cleaning their headers
//! - Estimating the time offset between two recordings (manual, rising-edge
//!   or peak-based alignment)
//! - Slicing both recordings to a common time window and exporting them
//! - Exporting a time window of a single recording
//! - Summary statistics and histograms of hexadecimal register dumps
//!
//! # Example
//!
//! ```no_run
//! use csv_plot::{core::loaders::load_csv, estimate_offset, AlignmentConfig, SamplingInterval};
//!
//! let a = load_csv("input/data1.csv").unwrap();
//! let b = load_csv("input/data2.csv").unwrap();
//! let dt = SamplingInterval::from_millis(100.0).unwrap();
//! let estimate = estimate_offset(&a.columns, &b.columns, dt, &AlignmentConfig::default()).unwrap();
//! println!("{}", estimate);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{AlignmentConfig, AlignmentMethod, CompareConfig, ConfigError, SingleConfig};
pub use crate::core::loaders::DataTable;
pub use processors::alignment::{estimate_offset, AlignmentError, OffsetEstimate, SamplingInterval};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
