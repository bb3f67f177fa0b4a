//! Peak finding and peak-based alignment.

use log::{info, warn};

use super::alignment::SamplingInterval;

/// Outcome of a first-peak search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakSearch {
    /// Index of the first qualifying peak
    Found(usize),
    /// No local maximum reached the minimum height
    NotFound,
}

impl PeakSearch {
    /// The peak index, if one was found.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            PeakSearch::Found(index) => Some(index),
            PeakSearch::NotFound => None,
        }
    }
}

/// Find all local maxima of `signal` whose value is at least `height`.
///
/// A sample is a peak when it is strictly greater than its left neighbour
/// and greater than the first differing sample to its right. For a flat top
/// the middle sample (rounded down) is reported. The first and last samples
/// are never peaks.
pub fn find_peaks(signal: &[f64], height: f64) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            // Skip over a plateau
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }

            if signal[ahead] < signal[i] {
                let mid = (i + ahead - 1) / 2;
                if signal[mid] >= height {
                    peaks.push(mid);
                }
                i = ahead;
            }
        }
        i += 1;
    }

    peaks
}

/// First peak of `signal` at or above `height`.
pub fn first_peak(signal: &[f64], height: f64) -> PeakSearch {
    find_peaks(signal, height)
        .first()
        .map_or(PeakSearch::NotFound, |&index| PeakSearch::Found(index))
}

/// Estimate the offset of `signal2` relative to `signal1` from their first peaks.
///
/// The index difference is divided by the sampling interval, unlike the
/// rising-edge strategy which multiplies by it. If either signal has no peak
/// the offset is exactly `0.0`.
pub fn peak_alignment(
    signal1: &[f64],
    signal2: &[f64],
    interval: SamplingInterval,
    height: f64,
) -> (f64, PeakSearch, PeakSearch) {
    let peak1 = first_peak(signal1, height);
    let peak2 = first_peak(signal2, height);

    let (p1, p2) = match (peak1.index(), peak2.index()) {
        (Some(p1), Some(p2)) => (p1, p2),
        _ => {
            warn!("[Peak Detection] No peaks found, falling back to zero offset.");
            return (0.0, peak1, peak2);
        }
    };

    let lag = p1 as f64 - p2 as f64;
    let offset_s = lag / interval.seconds();

    info!("Peak found at index {} (signal1) and {} (signal2)", p1, p2);
    info!("[Peak Detection] Estimated offset: {:.3} seconds", offset_s);

    (offset_s, peak1, peak2)
}
