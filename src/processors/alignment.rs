//! Time-offset estimation between two sampled signals.
//!
//! [`estimate_offset`] is the entry point: it validates the configured
//! alignment columns, normalizes them and dispatches to one strategy:
//!
//! | method              | strategy                         |
//! |---------------------|----------------------------------|
//! | `manual`            | `manual_offset_s`, no analysis   |
//! | `peak_detection`    | [`peak_alignment`]               |
//! | anything else       | [`rising_edge_alignment`]        |

use std::fmt;

use log::{debug, info};
use thiserror::Error;

use super::normalize::normalize;
use super::peaks::{peak_alignment, PeakSearch};
use super::rising_edge::{rising_edge_alignment, EdgeSearch};
use crate::config::{AlignmentConfig, AlignmentMethod};

/// Errors that can occur while estimating an offset.
#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error(
        "Column index out of range. File1: [0, {}], File2: [0, {}] (requested {} and {})",
        .file1_columns.saturating_sub(1),
        .file2_columns.saturating_sub(1),
        .file1_index,
        .file2_index
    )]
    ColumnOutOfRange {
        file1_index: usize,
        file1_columns: usize,
        file2_index: usize,
        file2_columns: usize,
    },

    #[error("Signal has zero variance (every sample is {value}), cannot normalize")]
    DegenerateSignal { value: f64 },

    #[error("Signal has no samples")]
    EmptySignal,

    #[error("Sampling interval must be a positive number of seconds, got {0}")]
    InvalidSamplingInterval(f64),
}

/// Result type for alignment operations.
pub type Result<T> = std::result::Result<T, AlignmentError>;

/// Seconds between two consecutive samples. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingInterval(f64);

impl SamplingInterval {
    pub fn new(seconds: f64) -> Result<Self> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(AlignmentError::InvalidSamplingInterval(seconds))
        }
    }

    /// Build from a millisecond value as found in configuration files.
    pub fn from_millis(ms: f64) -> Result<Self> {
        Self::new(crate::core::timeline::ms_to_seconds(ms))
            .map_err(|_| AlignmentError::InvalidSamplingInterval(ms))
    }

    #[inline]
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Samples per second.
    #[inline]
    pub fn rate_hz(self) -> f64 {
        1.0 / self.0
    }
}

/// What the estimator did to arrive at an offset.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentOutcome {
    Manual,
    RisingEdge {
        /// Configured method name that led to rising-edge detection
        requested: AlignmentMethod,
        edge1: EdgeSearch,
        edge2: EdgeSearch,
    },
    PeakDetection {
        peak1: PeakSearch,
        peak2: PeakSearch,
    },
}

/// Estimated offset of file 2 relative to file 1.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetEstimate {
    /// Shift applied to the file 2 timeline
    pub offset_s: f64,
    pub outcome: AlignmentOutcome,
}

impl fmt::Display for OffsetEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AlignmentOutcome::Manual => {
                write!(f, "[Manual Mode] Using manual offset: {:.3} seconds", self.offset_s)
            }
            AlignmentOutcome::RisingEdge { requested, edge1, edge2 } => {
                write!(
                    f,
                    "[Rising-Edge] ({}) edges at index {} and {}",
                    requested,
                    describe_edge(*edge1),
                    describe_edge(*edge2)
                )?;
                write!(f, ", estimated offset: {:.3} seconds", self.offset_s)
            }
            AlignmentOutcome::PeakDetection { peak1, peak2 } => match (peak1, peak2) {
                (PeakSearch::Found(p1), PeakSearch::Found(p2)) => write!(
                    f,
                    "[Peak Detection] peaks at index {} and {}, estimated offset: {:.3} seconds",
                    p1, p2, self.offset_s
                ),
                _ => write!(
                    f,
                    "[Peak Detection] No peaks found, falling back to zero offset ({:.3} seconds)",
                    self.offset_s
                ),
            },
        }
    }
}

fn describe_edge(edge: EdgeSearch) -> String {
    match edge {
        EdgeSearch::Found(index) => index.to_string(),
        EdgeSearch::NotFound => format!("{} (no edge)", edge.index()),
    }
}

/// Estimate the time offset between two files.
///
/// `columns1` and `columns2` hold every column of each file, column 0 being
/// the sample column. The alignment columns are taken from `config`.
///
/// # Errors
///
/// * `ColumnOutOfRange` if either alignment column does not exist
/// * `EmptySignal` / `DegenerateSignal` if a selected column cannot be
///   normalized (never raised in manual mode)
pub fn estimate_offset(
    columns1: &[Vec<f64>],
    columns2: &[Vec<f64>],
    interval: SamplingInterval,
    config: &AlignmentConfig,
) -> Result<OffsetEstimate> {
    let col1 = config.auto_align_column_file1;
    let col2 = config.auto_align_column_file2;

    if col1 >= columns1.len() || col2 >= columns2.len() {
        return Err(AlignmentError::ColumnOutOfRange {
            file1_index: col1,
            file1_columns: columns1.len(),
            file2_index: col2,
            file2_columns: columns2.len(),
        });
    }

    let method = config.effective_method();
    debug!(
        "Estimating offset with method '{}' on columns {} and {} ({} Hz)",
        method,
        col1,
        col2,
        interval.rate_hz()
    );

    if method == AlignmentMethod::Manual {
        info!("[Manual Mode] Using manual offset: {:.3} seconds", config.manual_offset_s);
        return Ok(OffsetEstimate {
            offset_s: config.manual_offset_s,
            outcome: AlignmentOutcome::Manual,
        });
    }

    let signal1 = normalize(&columns1[col1])?;
    let signal2 = normalize(&columns2[col2])?;

    let estimate = match method {
        AlignmentMethod::PeakDetection => {
            let (offset_s, peak1, peak2) =
                peak_alignment(&signal1, &signal2, interval, config.peak_height);
            OffsetEstimate {
                offset_s,
                outcome: AlignmentOutcome::PeakDetection { peak1, peak2 },
            }
        }
        requested => {
            let (offset_s, edge1, edge2) =
                rising_edge_alignment(&signal1, &signal2, interval, config.slope_threshold);
            OffsetEstimate {
                offset_s,
                outcome: AlignmentOutcome::RisingEdge { requested, edge1, edge2 },
            }
        }
    };

    Ok(estimate)
}
