//! Two-file comparison: load, align, window and export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use super::alignment::{estimate_offset, OffsetEstimate, SamplingInterval};
use crate::config::CompareConfig;
use crate::core::loaders::{load_csv, validate_structure, DataTable};
use crate::core::timeline::{compute_window, generate_time_series, IndexWindow};
use crate::core::writers::{write_aligned_csv, SeriesSlice};

/// File name of the exported table inside `output_dir`.
pub const DEFAULT_OUTPUT_NAME: &str = "comparison_aligned.csv";

/// Errors specific to the comparison workflow.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Both input_file_1 and input_file_2 must be specified")]
    MissingInput,

    #[error("columns_to_plot index {index} is out of range, {available} data columns available")]
    ColumnSelection { index: usize, available: usize },
}

/// Outcome of a comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// Offset applied to file 2
    pub offset_s: f64,
    /// Estimator output; `None` when no alignment method is configured
    pub estimate: Option<OffsetEstimate>,
    pub window: IndexWindow,
    /// Names of the exported columns
    pub columns: Vec<String>,
    pub output_path: PathBuf,
    pub rows_written: usize,
}

/// Both configured input files.
pub fn input_paths(config: &CompareConfig) -> Result<(&Path, &Path)> {
    match (&config.input_file_1, &config.input_file_2) {
        (Some(a), Some(b)) => Ok((a.as_path(), b.as_path())),
        _ => Err(CompareError::MissingInput.into()),
    }
}

/// Load both input files, clean their headers and check they are comparable.
pub fn load_pair(config: &CompareConfig) -> Result<(DataTable, DataTable)> {
    let (path1, path2) = input_paths(config)?;

    let mut table1 = load_csv(path1)
        .with_context(|| format!("Failed to load input file: {}", path1.display()))?;
    let mut table2 = load_csv(path2)
        .with_context(|| format!("Failed to load input file: {}", path2.display()))?;

    table1.clean_headers(&config.header_cleanup);
    table2.clean_headers(&config.header_cleanup);

    validate_structure(&table1, &table2)?;

    Ok((table1, table2))
}

/// Offset for file 2: estimated when an alignment method is configured,
/// otherwise `manual_offset_s`.
pub fn resolve_offset(
    table1: &DataTable,
    table2: &DataTable,
    interval: SamplingInterval,
    config: &CompareConfig,
) -> Result<(f64, Option<OffsetEstimate>)> {
    match config.alignment.method {
        Some(_) => {
            let estimate =
                estimate_offset(&table1.columns, &table2.columns, interval, &config.alignment)?;
            Ok((estimate.offset_s, Some(estimate)))
        }
        None => {
            info!(
                "No alignment_method configured, using manual_offset_s = {}",
                config.alignment.manual_offset_s
            );
            Ok((config.alignment.manual_offset_s, None))
        }
    }
}

/// Map `columns_to_plot` (data column indices, sample column excluded) to
/// table column indices. An empty selection means every data column.
pub fn select_columns(table: &DataTable, columns_to_plot: &[usize]) -> Result<Vec<usize>> {
    let available = table.num_columns().saturating_sub(1);

    if columns_to_plot.is_empty() {
        return Ok((1..=available).collect());
    }

    columns_to_plot
        .iter()
        .map(|&index| {
            if index < available {
                Ok(index + 1)
            } else {
                Err(anyhow::Error::from(CompareError::ColumnSelection { index, available }))
            }
        })
        .collect()
}

/// Run the full comparison and write the aligned table.
///
/// `output` overrides `<output_dir>/comparison_aligned.csv`.
pub fn run_comparison(config: &CompareConfig, output: Option<&Path>) -> Result<ComparisonResult> {
    let interval = SamplingInterval::from_millis(config.sampling_interval_ms)?;
    let (table1, table2) = load_pair(config)?;

    let (offset_s, estimate) = resolve_offset(&table1, &table2, interval, config)?;
    if let Some(estimate) = &estimate {
        info!("{}", estimate);
    }

    let selected = select_columns(&table1, &config.columns_to_plot)?;
    let time_window = config.window()?;

    let time1 = generate_time_series(table1.num_rows(), interval, 0.0);
    let time2 = generate_time_series(table2.num_rows(), interval, offset_s);
    let window = compute_window(
        table1.num_rows(),
        table2.num_rows(),
        interval,
        offset_s,
        time_window,
    );

    let series = [
        SeriesSlice {
            source: "file1",
            time_s: &time1[window.file1.clone()],
            values: selected
                .iter()
                .map(|&c| &table1.columns[c][window.file1.clone()])
                .collect(),
        },
        SeriesSlice {
            source: "file2",
            time_s: &time2[window.file2.clone()],
            values: selected
                .iter()
                .map(|&c| &table2.columns[c][window.file2.clone()])
                .collect(),
        },
    ];

    let columns: Vec<String> = selected.iter().map(|&c| table1.headers[c].clone()).collect();
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir.join(DEFAULT_OUTPUT_NAME));

    let rows_written = write_aligned_csv(&output_path, &columns, &series)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(ComparisonResult {
        offset_s,
        estimate,
        window,
        columns,
        output_path,
        rows_written,
    })
}
