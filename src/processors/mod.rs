//! Signal processing and the comparison, single-file and histogram workflows.

pub mod alignment;
pub mod compare;
pub mod histogram;
pub mod normalize;
pub mod peaks;
pub mod rising_edge;
pub mod single;

// Re-export key types for convenience
pub use alignment::{
    estimate_offset, AlignmentError, AlignmentOutcome, OffsetEstimate, SamplingInterval,
};
pub use compare::{run_comparison, CompareError, ComparisonResult};
pub use histogram::{column_stats, histogram, run_histogram, ColumnStats, Histogram};
pub use normalize::normalize;
pub use peaks::{find_peaks, peak_alignment, PeakSearch};
pub use rising_edge::{find_rising_edge, rising_edge_alignment, EdgeSearch};
pub use single::{run_single, SingleError, SingleResult};
