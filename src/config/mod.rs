//! Configuration types for the CSV comparison tool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors found while interpreting configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("time_window must be empty or [start_s, end_s], got {0} values")]
    InvalidTimeWindow(usize),

    #[error("histogram_bins must be at least 1")]
    ZeroBins,
}

/// Interpret a `time_window` list: empty means the full range, two values are
/// `(start_s, end_s)`, any other length is rejected.
pub fn parse_time_window(values: &[f64]) -> Result<Option<(f64, f64)>, ConfigError> {
    match values {
        [] => Ok(None),
        [start, end] => Ok(Some((*start, *end))),
        other => Err(ConfigError::InvalidTimeWindow(other.len())),
    }
}

/// Strategy used to estimate the offset between two files.
///
/// Any string is accepted. Names other than `manual` and `peak_detection`
/// fall through to rising-edge detection, including `cross_correlation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlignmentMethod {
    /// Use `manual_offset_s` verbatim
    Manual,
    /// First peak above `peak_height` in each signal
    PeakDetection,
    /// Historical name; runs rising-edge detection
    #[default]
    CrossCorrelation,
    /// Unrecognised name; runs rising-edge detection
    Other(String),
}

impl From<String> for AlignmentMethod {
    fn from(name: String) -> Self {
        match name.as_str() {
            "manual" => AlignmentMethod::Manual,
            "peak_detection" => AlignmentMethod::PeakDetection,
            "cross_correlation" => AlignmentMethod::CrossCorrelation,
            _ => AlignmentMethod::Other(name),
        }
    }
}

impl From<AlignmentMethod> for String {
    fn from(method: AlignmentMethod) -> Self {
        method.to_string()
    }
}

impl fmt::Display for AlignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMethod::Manual => f.write_str("manual"),
            AlignmentMethod::PeakDetection => f.write_str("peak_detection"),
            AlignmentMethod::CrossCorrelation => f.write_str("cross_correlation"),
            AlignmentMethod::Other(name) => f.write_str(name),
        }
    }
}

/// Parameters for the offset estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Alignment strategy. When absent, the comparison uses `manual_offset_s`
    /// without running the estimator.
    #[serde(default, rename = "alignment_method", alias = "method")]
    pub method: Option<AlignmentMethod>,

    /// Column of file 1 used for alignment (0 is the sample column)
    #[serde(default = "default_align_column")]
    pub auto_align_column_file1: usize,

    /// Column of file 2 used for alignment (0 is the sample column)
    #[serde(default = "default_align_column")]
    pub auto_align_column_file2: usize,

    /// Offset in seconds applied to file 2 in manual mode
    #[serde(default)]
    pub manual_offset_s: f64,

    /// Slope threshold for rising-edge detection
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: f64,

    /// Minimum normalized height for peak detection
    #[serde(default = "default_peak_height")]
    pub peak_height: f64,
}

fn default_align_column() -> usize {
    1
}

fn default_slope_threshold() -> f64 {
    0.1
}

fn default_peak_height() -> f64 {
    0.5
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            method: None,
            auto_align_column_file1: default_align_column(),
            auto_align_column_file2: default_align_column(),
            manual_offset_s: 0.0,
            slope_threshold: default_slope_threshold(),
            peak_height: default_peak_height(),
        }
    }
}

impl AlignmentConfig {
    /// Method the estimator runs, defaulting to `cross_correlation`.
    pub fn effective_method(&self) -> AlignmentMethod {
        self.method.clone().unwrap_or_default()
    }
}

/// Configuration of a two-file comparison.
///
/// Keys are flat, so alignment settings sit next to the file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// First CSV file
    #[serde(default)]
    pub input_file_1: Option<PathBuf>,

    /// Second CSV file
    #[serde(default)]
    pub input_file_2: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[serde(
        default = "default_sampling_interval_ms",
        rename = "sampling_interval_s_ms",
        alias = "sampling_interval_ms"
    )]
    pub sampling_interval_ms: f64,

    /// `[start_s, end_s]` on the file 1 timeline; empty for the full range
    #[serde(default)]
    pub time_window: Vec<f64>,

    #[serde(flatten)]
    pub alignment: AlignmentConfig,

    /// Data column indices to export, not counting the sample column
    #[serde(default)]
    pub columns_to_plot: Vec<usize>,

    /// Substrings stripped from column headers
    #[serde(default)]
    pub header_cleanup: Vec<String>,

    /// Directory receiving the exported CSV
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_sampling_interval_ms() -> f64 {
    100.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            input_file_1: None,
            input_file_2: None,
            sampling_interval_ms: default_sampling_interval_ms(),
            time_window: Vec::new(),
            alignment: AlignmentConfig::default(),
            columns_to_plot: Vec::new(),
            header_cleanup: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}

impl CompareConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: CompareConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Time window as `(start_s, end_s)`, if one is configured.
    pub fn window(&self) -> Result<Option<(f64, f64)>, ConfigError> {
        parse_time_window(&self.time_window)
    }
}

/// Configuration of a single-file export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleConfig {
    /// CSV file to export
    #[serde(default)]
    pub input_file: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[serde(
        default = "default_sampling_interval_ms",
        alias = "sampling_interval_ms"
    )]
    pub sampling_rate_ms: f64,

    /// `[start_s, end_s]`; empty for the full file
    #[serde(default)]
    pub time_window: Vec<f64>,

    /// Data column indices to export, not counting the sample column
    #[serde(default)]
    pub columns_to_plot: Vec<usize>,

    /// Substrings stripped from column headers
    #[serde(default)]
    pub header_cleanup: Vec<String>,

    /// Directory receiving the exported CSV files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of equal-width bins per column in the histogram export
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_histogram_bins() -> usize {
    30
}

impl Default for SingleConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            sampling_rate_ms: default_sampling_interval_ms(),
            time_window: Vec::new(),
            columns_to_plot: Vec::new(),
            header_cleanup: Vec::new(),
            output_dir: default_output_dir(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

impl SingleConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: SingleConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Time window as `(start_s, end_s)`, if one is configured.
    pub fn window(&self) -> Result<Option<(f64, f64)>, ConfigError> {
        parse_time_window(&self.time_window)
    }

    /// Histogram bin count, rejecting zero.
    pub fn bins(&self) -> Result<usize, ConfigError> {
        match self.histogram_bins {
            0 => Err(ConfigError::ZeroBins),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compare_config() {
        let config = CompareConfig::default();
        assert_eq!(config.sampling_interval_ms, 100.0);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.alignment.auto_align_column_file1, 1);
        assert_eq!(config.alignment.slope_threshold, 0.1);
        assert_eq!(config.alignment.peak_height, 0.5);
        assert!(config.alignment.method.is_none());
        assert_eq!(config.window(), Ok(None));
    }

    #[test]
    fn test_time_window_lengths() {
        assert_eq!(parse_time_window(&[]), Ok(None));
        assert_eq!(parse_time_window(&[0.5, 2.0]), Ok(Some((0.5, 2.0))));
        assert_eq!(parse_time_window(&[1.0]), Err(ConfigError::InvalidTimeWindow(1)));
        assert_eq!(
            parse_time_window(&[1.0, 2.0, 3.0]),
            Err(ConfigError::InvalidTimeWindow(3))
        );

        let config = CompareConfig {
            time_window: vec![4.0],
            ..CompareConfig::default()
        };
        assert!(config.window().unwrap_err().to_string().contains("got 1 values"));
    }

    #[test]
    fn test_default_method_is_cross_correlation() {
        assert_eq!(AlignmentMethod::default(), AlignmentMethod::CrossCorrelation);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(AlignmentMethod::from("manual".to_string()), AlignmentMethod::Manual);
        assert_eq!(
            AlignmentMethod::from("peak_detection".to_string()),
            AlignmentMethod::PeakDetection
        );
        assert_eq!(
            AlignmentMethod::from("cross_correlation".to_string()),
            AlignmentMethod::CrossCorrelation
        );
        assert_eq!(
            AlignmentMethod::from("rising_edge".to_string()),
            AlignmentMethod::Other("rising_edge".to_string())
        );
        assert_eq!(AlignmentConfig::default().effective_method(), AlignmentMethod::CrossCorrelation);
    }

    #[test]
    fn test_parse_flat_yaml() {
        let yaml = r#"
input_file_1: input/a.csv
input_file_2: input/b.csv
sampling_interval_s_ms: 50
time_window: [1.0, 4.5]
alignment_method: peak_detection
auto_align_column_file1: 2
manual_offset_s: 5.0
header_cleanup: ["Ave. (C)", "(C)"]
"#;
        let config: CompareConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.input_file_1, Some(PathBuf::from("input/a.csv")));
        assert_eq!(config.sampling_interval_ms, 50.0);
        assert_eq!(config.window(), Ok(Some((1.0, 4.5))));
        assert_eq!(config.alignment.method, Some(AlignmentMethod::PeakDetection));
        assert_eq!(config.alignment.auto_align_column_file1, 2);
        assert_eq!(config.alignment.auto_align_column_file2, 1);
        assert_eq!(config.alignment.manual_offset_s, 5.0);
        assert_eq!(config.header_cleanup.len(), 2);
    }

    #[test]
    fn test_yaml_roundtrip_keeps_unknown_method_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = CompareConfig::default();
        config.alignment.method = Some(AlignmentMethod::Other("xcorr".to_string()));
        config.to_yaml(&path).unwrap();

        let loaded = CompareConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded.alignment.method, Some(AlignmentMethod::Other("xcorr".to_string())));
        assert_eq!(loaded.output_dir, config.output_dir);
    }

    #[test]
    fn test_parse_single_yaml() {
        let yaml = r#"
input_file: input/run.csv
sampling_rate_ms: 20
time_window: [0.0, 1.5]
columns_to_plot: [0, 2]
"#;
        let config: SingleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.input_file, Some(PathBuf::from("input/run.csv")));
        assert_eq!(config.sampling_rate_ms, 20.0);
        assert_eq!(config.window(), Ok(Some((0.0, 1.5))));
        assert_eq!(config.columns_to_plot, vec![0, 2]);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.bins(), Ok(30));
    }

    #[test]
    fn test_single_config_rejects_zero_bins() {
        let config = SingleConfig {
            histogram_bins: 0,
            ..SingleConfig::default()
        };
        assert_eq!(config.bins(), Err(ConfigError::ZeroBins));
    }
}
