//! Single-file export: time axis, window and column selection.

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use super::alignment::SamplingInterval;
use super::compare::select_columns;
use crate::config::SingleConfig;
use crate::core::loaders::load_csv;
use crate::core::timeline::{generate_time_series, single_window};
use crate::core::writers::{write_aligned_csv, SeriesSlice};

/// Errors specific to the single-file workflows.
#[derive(Debug, Error)]
pub enum SingleError {
    #[error("input_file must be specified")]
    MissingInput,

    #[error("column '{0}' has no usable values")]
    EmptyColumn(String),
}

/// Outcome of a single-file export.
#[derive(Debug, Clone)]
pub struct SingleResult {
    /// Rows of the input file inside the time window
    pub rows: Range<usize>,
    /// Names of the exported columns
    pub columns: Vec<String>,
    pub output_path: PathBuf,
    pub rows_written: usize,
}

/// The configured input file.
pub fn input_path(config: &SingleConfig) -> Result<&Path> {
    config
        .input_file
        .as_deref()
        .ok_or_else(|| SingleError::MissingInput.into())
}

/// Load one file, cut it to the time window and export the selected columns.
///
/// `output` overrides `<output_dir>/<stem>_windowed.csv`, where `<stem>` is
/// the input file name without extension.
pub fn run_single(config: &SingleConfig, output: Option<&Path>) -> Result<SingleResult> {
    let interval = SamplingInterval::from_millis(config.sampling_rate_ms)?;
    let path = input_path(config)?;

    let mut table =
        load_csv(path).with_context(|| format!("Failed to load input file: {}", path.display()))?;
    table.clean_headers(&config.header_cleanup);

    let selected = select_columns(&table, &config.columns_to_plot)?;
    let rows = single_window(table.num_rows(), interval, config.window()?);
    info!(
        "Exporting rows {}..{} of {} from {}",
        rows.start,
        rows.end,
        table.num_rows(),
        path.display()
    );

    let stem = table.source_stem().unwrap_or("data").to_string();
    let time = generate_time_series(table.num_rows(), interval, 0.0);
    let series = [SeriesSlice {
        source: &stem,
        time_s: &time[rows.clone()],
        values: selected
            .iter()
            .map(|&c| &table.columns[c][rows.clone()])
            .collect(),
    }];

    let columns: Vec<String> = selected.iter().map(|&c| table.headers[c].clone()).collect();
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir.join(format!("{}_windowed.csv", stem)));

    let rows_written = write_aligned_csv(&output_path, &columns, &series)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(SingleResult {
        rows,
        columns,
        output_path,
        rows_written,
    })
}
