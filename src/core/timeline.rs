//! Time axes and time-window slicing for sampled files.

use std::ops::Range;

use crate::processors::alignment::SamplingInterval;

/// Convert milliseconds to seconds.
#[inline]
pub fn ms_to_seconds(ms: f64) -> f64 {
    ms / 1000.0
}

/// Timestamps `i * interval + offset_s` for `len` samples.
pub fn generate_time_series(len: usize, interval: SamplingInterval, offset_s: f64) -> Vec<f64> {
    let dt = interval.seconds();
    (0..len).map(|i| i as f64 * dt + offset_s).collect()
}

/// Sample ranges of both files covering the same stretch of time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexWindow {
    pub file1: Range<usize>,
    pub file2: Range<usize>,
}

/// Truncate `seconds / dt` toward zero and clamp into `[0, len]`.
fn to_index(seconds: f64, dt: f64, len: usize) -> usize {
    let raw = (seconds / dt) as i64;
    raw.clamp(0, len as i64) as usize
}

/// Compute the sample ranges to keep from each file.
///
/// The window end is clamped to the earlier of the two timeline ends (file 2
/// being shifted by `offset_s`). Without a window the range runs from 0 to
/// that end. Indices are truncated toward zero, so the sample at the exact end
/// time is excluded.
pub fn compute_window(
    len1: usize,
    len2: usize,
    interval: SamplingInterval,
    offset_s: f64,
    window: Option<(f64, f64)>,
) -> IndexWindow {
    let dt = interval.seconds();
    let end_time1 = len1.saturating_sub(1) as f64 * dt;
    let end_time2 = len2.saturating_sub(1) as f64 * dt + offset_s;
    let max_end = end_time1.min(end_time2);

    let (start_s, end_s) = match window {
        Some((start, end)) => (start, end.min(max_end)),
        None => (0.0, max_end),
    };

    let start1 = to_index(start_s, dt, len1);
    let end1 = to_index(end_s, dt, len1).max(start1);
    let start2 = to_index(start_s - offset_s, dt, len2);
    let end2 = to_index(end_s - offset_s, dt, len2).max(start2);

    IndexWindow {
        file1: start1..end1,
        file2: start2..end2,
    }
}

/// Sample range of a single file inside `window`.
///
/// Without a window the whole file is kept. Start and end are truncated
/// toward zero and clamped to the data, with `end >= start`.
pub fn single_window(
    len: usize,
    interval: SamplingInterval,
    window: Option<(f64, f64)>,
) -> Range<usize> {
    let dt = interval.seconds();
    match window {
        Some((start_s, end_s)) => {
            let start = to_index(start_s, dt, len);
            let end = to_index(end_s, dt, len).max(start);
            start..end
        }
        None => 0..len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(seconds: f64) -> SamplingInterval {
        SamplingInterval::new(seconds).unwrap()
    }

    #[test]
    fn test_ms_to_seconds() {
        assert_eq!(ms_to_seconds(100.0), 0.1);
        assert_eq!(ms_to_seconds(2500.0), 2.5);
    }

    #[test]
    fn test_generate_time_series() {
        assert_eq!(generate_time_series(4, dt(0.5), 0.0), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(generate_time_series(3, dt(1.0), 2.0), vec![2.0, 3.0, 4.0]);
        assert!(generate_time_series(0, dt(1.0), 0.0).is_empty());
    }

    #[test]
    fn test_full_range_without_offset() {
        let window = compute_window(10, 10, dt(1.0), 0.0, None);
        assert_eq!(window.file1, 0..9);
        assert_eq!(window.file2, 0..9);
    }

    #[test]
    fn test_positive_offset_shifts_file2() {
        // File 2 starts 2 s later, so its end (9 + 2) is beyond file 1's end (9)
        let window = compute_window(10, 10, dt(1.0), 2.0, None);
        assert_eq!(window.file1, 0..9);
        assert_eq!(window.file2, 0..7);
    }

    #[test]
    fn test_negative_offset_clamps_to_data() {
        let window = compute_window(10, 10, dt(1.0), -3.0, None);
        assert_eq!(window.file1, 0..6);
        assert_eq!(window.file2, 3..9);
    }

    #[test]
    fn test_explicit_window_is_clamped() {
        let window = compute_window(100, 100, dt(1.0), 0.0, Some((10.0, 500.0)));
        assert_eq!(window.file1, 10..99);
        assert_eq!(window.file2, 10..99);
    }

    #[test]
    fn test_window_outside_data_is_empty() {
        let window = compute_window(10, 10, dt(1.0), 0.0, Some((20.0, 30.0)));
        assert!(window.file1.is_empty());
        assert!(window.file2.is_empty());
        assert!(window.file1.end <= 10);
    }

    #[test]
    fn test_single_window() {
        assert_eq!(single_window(10, dt(0.1), None), 0..10);
        assert_eq!(single_window(10, dt(0.1), Some((0.2, 0.55))), 2..5);
        assert_eq!(single_window(10, dt(0.1), Some((0.5, 100.0))), 5..10);
        assert_eq!(single_window(10, dt(0.1), Some((-1.0, 0.35))), 0..3);
        assert_eq!(single_window(10, dt(0.1), Some((0.8, 0.2))), 8..8);
    }
}
