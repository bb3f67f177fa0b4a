//! CSV export of aligned series.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use crate::processors::histogram::{ColumnStats, Histogram};

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Series shape does not match the header.
    #[error("series '{source_name}' has {columns} value columns and {rows} time stamps, expected {expected_columns} columns of {rows} values")]
    ShapeMismatch {
        source_name: String,
        columns: usize,
        expected_columns: usize,
        rows: usize,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// One file's windowed samples ready for export.
#[derive(Debug, Clone)]
pub struct SeriesSlice<'a> {
    /// Value written to the `source` column
    pub source: &'a str,
    /// Timestamps in seconds, already offset
    pub time_s: &'a [f64],
    /// One slice per exported column, each as long as `time_s`
    pub values: Vec<&'a [f64]>,
}

impl SeriesSlice<'_> {
    fn check_shape(&self, expected_columns: usize) -> Result<()> {
        let rows = self.time_s.len();
        if self.values.len() != expected_columns || self.values.iter().any(|v| v.len() != rows) {
            return Err(WriteError::ShapeMismatch {
                source_name: self.source.to_string(),
                columns: self.values.len(),
                expected_columns,
                rows,
            });
        }
        Ok(())
    }
}

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write aligned series in long format.
///
/// The header is `time_s,source,<column_names...>`. Rows of each series
/// follow in order, so files of different lengths fit in one table.
///
/// # Returns
///
/// The number of data rows written.
///
/// # Example
///
/// ```no_run
/// use csv_plot::core::writers::{write_aligned_csv, SeriesSlice};
/// use std::path::Path;
///
/// let time = [0.0, 0.1];
/// let temp = [20.0, 20.5];
/// let series = SeriesSlice { source: "file1", time_s: &time, values: vec![&temp[..]] };
/// write_aligned_csv(Path::new("aligned.csv"), &["Temp".to_string()], &[series]).unwrap();
/// ```
pub fn write_aligned_csv(
    path: &Path,
    column_names: &[String],
    series: &[SeriesSlice<'_>],
) -> Result<usize> {
    for s in series {
        s.check_shape(column_names.len())?;
    }

    let mut header = vec!["time_s".to_string(), "source".to_string()];
    header.extend(column_names.iter().cloned());

    let mut records = Vec::new();
    for s in series {
        for (i, t) in s.time_s.iter().enumerate() {
            let mut record = Vec::with_capacity(column_names.len() + 2);
            record.push(format!("{:.6}", t));
            record.push(s.source.to_string());
            record.extend(s.values.iter().map(|v| v[i].to_string()));
            records.push(record);
        }
    }

    write_records(path, &header, records)
}

/// Write per-column summary statistics, one row per column.
///
/// The header is `column,count,mean,std,min,max,delta`. An undefined
/// standard deviation (fewer than two samples) is written as `NaN`.
pub fn write_column_stats_csv(
    path: &Path,
    column_names: &[String],
    stats: &[ColumnStats],
) -> Result<usize> {
    let header = ["column", "count", "mean", "std", "min", "max", "delta"].map(String::from);

    let records = column_names.iter().zip(stats).map(|(name, st)| {
        vec![
            name.clone(),
            st.count.to_string(),
            st.mean.to_string(),
            st.std.to_string(),
            st.min.to_string(),
            st.max.to_string(),
            st.delta.to_string(),
        ]
    });

    write_records(path, &header, records)
}

/// Write histogram bins in long format, one row per column and bin.
///
/// The header is `column,bin_start,bin_end,count`.
pub fn write_histogram_csv(
    path: &Path,
    column_names: &[String],
    histograms: &[Histogram],
) -> Result<usize> {
    let header = ["column", "bin_start", "bin_end", "count"].map(String::from);

    let records = column_names.iter().zip(histograms).flat_map(|(name, hist)| {
        hist.counts.iter().enumerate().map(move |(i, count)| {
            vec![
                name.clone(),
                hist.edges[i].to_string(),
                hist.edges[i + 1].to_string(),
                count.to_string(),
            ]
        })
    });

    write_records(path, &header, records)
}

/// Write a header and records, returning the number of records.
fn write_records<I>(path: &Path, header: &[String], records: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<String>>,
{
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));

    let path_str = path.display().to_string();
    let csv_err = |e: csv::Error| WriteError::CsvError {
        path: path_str.clone(),
        source: e,
    };

    csv_writer.write_record(header).map_err(csv_err)?;

    let mut rows = 0;
    for record in records {
        csv_writer.write_record(&record).map_err(csv_err)?;
        rows += 1;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    })?;

    Ok(rows)
}
