//! Value distribution of hexadecimal register dumps.
//!
//! Every column of the file is summarised (count, mean, sample standard
//! deviation, min, max, spread) and binned into equal-width histograms.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use super::single::{input_path, SingleError};
use crate::config::SingleConfig;
use crate::core::loaders::load_hex_csv;
use crate::core::writers::{write_column_stats_csv, write_histogram_csv};

/// Summary statistics of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (divides by `n - 1`); `NaN` below two samples
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// `max - min`
    pub delta: f64,
}

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Statistics of `values`, or `None` when there are none.
pub fn column_stats(values: &[f64]) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() < 2 {
        f64::NAN
    } else {
        (values.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0)).sqrt()
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(ColumnStats {
        count: values.len(),
        mean,
        std,
        min,
        max,
        delta: max - min,
    })
}

/// Bin `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// Every bin is half-open except the last, which includes `max`. When all
/// values are equal the range is widened to `[v - 0.5, v + 0.5]`. Non-finite
/// values are ignored. Returns `None` if `bins` is zero or no finite value
/// remains.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if bins == 0 || finite.is_empty() {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = hi - lo;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| lo + width * i as f64 / bins as f64)
        .collect();

    let mut counts = vec![0; bins];
    for v in finite {
        let mut idx = (((v - lo) / width) * bins as f64) as usize;
        idx = idx.min(bins - 1);

        // Rounding can land one bin off near an edge
        if v < edges[idx] && idx > 0 {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Outcome of a histogram run.
#[derive(Debug, Clone)]
pub struct HistogramResult {
    pub columns: Vec<String>,
    pub stats: Vec<ColumnStats>,
    pub histograms: Vec<Histogram>,
    pub stats_path: PathBuf,
    pub histogram_path: PathBuf,
}

/// Load a hexadecimal CSV, summarise every column and export the statistics
/// and bin counts to `<output_dir>/<stem>_stats.csv` and
/// `<output_dir>/<stem>_histogram.csv`.
pub fn run_histogram(config: &SingleConfig) -> Result<HistogramResult> {
    let path = input_path(config)?;
    let bins = config.bins()?;

    let mut table = load_hex_csv(path)
        .with_context(|| format!("Failed to load input file: {}", path.display()))?;
    table.clean_headers(&config.header_cleanup);

    let mut stats = Vec::with_capacity(table.num_columns());
    let mut histograms = Vec::with_capacity(table.num_columns());
    for (name, values) in table.headers.iter().zip(&table.columns) {
        let st = column_stats(values).ok_or_else(|| SingleError::EmptyColumn(name.clone()))?;
        let hist =
            histogram(values, bins).ok_or_else(|| SingleError::EmptyColumn(name.clone()))?;

        info!(
            "{}: mean = {:.2}, std = {:.2}, min = {}, max = {}, delta = {}",
            name, st.mean, st.std, st.min, st.max, st.delta
        );

        stats.push(st);
        histograms.push(hist);
    }

    let stem = table.source_stem().unwrap_or("data");
    let stats_path = config.output_dir.join(format!("{}_stats.csv", stem));
    let histogram_path = config.output_dir.join(format!("{}_histogram.csv", stem));

    write_column_stats_csv(&stats_path, &table.headers, &stats)
        .with_context(|| format!("Failed to write {}", stats_path.display()))?;
    write_histogram_csv(&histogram_path, &table.headers, &histograms)
        .with_context(|| format!("Failed to write {}", histogram_path.display()))?;

    Ok(HistogramResult {
        columns: table.headers,
        stats,
        histograms,
        stats_path,
        histogram_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_column_stats() {
        let st = column_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(st.count, 8);
        assert_eq!(st.mean, 5.0);
        // Sample std: sqrt(32 / 7)
        assert!((st.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(st.min, 2.0);
        assert_eq!(st.max, 9.0);
        assert_eq!(st.delta, 7.0);
    }

    #[test]
    fn test_column_stats_single_value() {
        let st = column_stats(&[42.0]).unwrap();
        assert_eq!(st.mean, 42.0);
        assert!(st.std.is_nan());
        assert_eq!(st.delta, 0.0);
        assert!(column_stats(&[]).is_none());
    }

    #[test]
    fn test_histogram_bins() {
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let hist = histogram(&values, 5).unwrap();

        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        // Last bin holds 8, 9 and the maximum
        assert_eq!(hist.counts, vec![2, 2, 2, 2, 3]);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn test_histogram_constant_column() {
        let hist = histogram(&[7.0, 7.0, 7.0], 2).unwrap();
        assert_eq!(hist.edges, vec![6.5, 7.0, 7.5]);
        assert_eq!(hist.counts, vec![0, 3]);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..1000).map(|i| ((i * 37) % 101) as f64 * 0.3).collect();
        let hist = histogram(&values, 30).unwrap();

        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.edges.len(), 31);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn test_histogram_rejects_zero_bins_and_empty_input() {
        assert!(histogram(&[1.0, 2.0], 0).is_none());
        assert!(histogram(&[], 10).is_none());
        assert!(histogram(&[f64::NAN], 10).is_none());
    }

    #[test]
    fn test_run_histogram_exports_stats_and_bins() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("regs.csv");
        fs::write(&input, "Status (hex),Count\n0x0,1\n0x2,3\n0x4,5\n").unwrap();

        let config = SingleConfig {
            input_file: Some(input),
            header_cleanup: vec!["(hex)".to_string()],
            output_dir: temp_dir.path().join("output"),
            histogram_bins: 4,
            ..SingleConfig::default()
        };

        let result = run_histogram(&config).unwrap();
        assert_eq!(result.columns, vec!["Status", "Count"]);
        assert_eq!(result.stats[0].mean, 2.0);
        assert_eq!(result.stats[0].std, 2.0);
        assert_eq!(result.stats[1].delta, 4.0);
        assert_eq!(result.histograms[0].counts, vec![1, 0, 1, 1]);

        assert_eq!(result.stats_path, temp_dir.path().join("output").join("regs_stats.csv"));
        let stats = fs::read_to_string(&result.stats_path).unwrap();
        assert_eq!(stats.lines().nth(1), Some("Status,3,2,2,0,4,4"));

        let bins = fs::read_to_string(&result.histogram_path).unwrap();
        assert_eq!(bins.lines().count(), 1 + 2 * 4);
    }

    #[test]
    fn test_run_histogram_rejects_zero_bins() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("regs.csv");
        fs::write(&input, "A\n0x1\n").unwrap();

        let config = SingleConfig {
            input_file: Some(input),
            histogram_bins: 0,
            output_dir: temp_dir.path().join("output"),
            ..SingleConfig::default()
        };

        let err = run_histogram(&config).unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::ZeroBins));
    }
}
