//! Rising-edge detection and rising-edge alignment.

use log::{info, warn};

use super::alignment::SamplingInterval;

/// Slope threshold the rising-edge strategy actually applies.
pub const RISING_EDGE_THRESHOLD: f64 = 0.1;

/// Outcome of a rising-edge search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSearch {
    /// Sample index right after the first step exceeding the threshold
    Found(usize),
    /// No step exceeded the threshold
    NotFound,
}

impl EdgeSearch {
    /// Index reported to the offset formula.
    ///
    /// `NotFound` reports 1: the first difference slot mapped back to
    /// sample space.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            EdgeSearch::Found(index) => index,
            EdgeSearch::NotFound => 1,
        }
    }

    #[inline]
    pub fn is_found(self) -> bool {
        matches!(self, EdgeSearch::Found(_))
    }
}

/// Find the first sample where `signal[i] - signal[i - 1]` strictly exceeds
/// `threshold`.
pub fn find_rising_edge(signal: &[f64], threshold: f64) -> EdgeSearch {
    signal
        .windows(2)
        .position(|pair| pair[1] - pair[0] > threshold)
        .map_or(EdgeSearch::NotFound, |k| EdgeSearch::Found(k + 1))
}

/// Estimate the offset of `signal2` relative to `signal1` from their rising edges.
///
/// Both signals should already be normalized. Detection always uses
/// [`RISING_EDGE_THRESHOLD`]; `slope_threshold` is not forwarded.
///
/// Returns the offset in seconds together with both edge outcomes.
pub fn rising_edge_alignment(
    signal1: &[f64],
    signal2: &[f64],
    interval: SamplingInterval,
    slope_threshold: f64,
) -> (f64, EdgeSearch, EdgeSearch) {
    if slope_threshold != RISING_EDGE_THRESHOLD {
        warn!(
            "slope_threshold {} ignored, rising-edge detection uses {}",
            slope_threshold, RISING_EDGE_THRESHOLD
        );
    }

    let edge1 = find_rising_edge(signal1, RISING_EDGE_THRESHOLD);
    let edge2 = find_rising_edge(signal2, RISING_EDGE_THRESHOLD);

    for (name, edge) in [("signal1", edge1), ("signal2", edge2)] {
        if !edge.is_found() {
            warn!("[Rising-Edge] No rising edge in {}, using index {}", name, edge.index());
        }
    }

    let delta = edge1.index() as f64 - edge2.index() as f64;
    let offset_s = delta * interval.seconds();

    info!(
        "Rising edge found at index {} (signal1) and {} (signal2)",
        edge1.index(),
        edge2.index()
    );
    info!("[Rising-Edge] Estimated offset: {:.3} seconds", offset_s);

    (offset_s, edge1, edge2)
}
