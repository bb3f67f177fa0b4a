//! Zero-mean, unit-variance signal normalization.

use super::alignment::{AlignmentError, Result};

/// Rescale a signal to zero mean and unit standard deviation.
///
/// Uses the population standard deviation (divides by `n`), so thresholds
/// applied afterwards are comparable between signals recorded in different
/// physical units.
///
/// # Errors
///
/// * `EmptySignal` if `signal` has no samples
/// * `DegenerateSignal` if every sample has the same value, or the spread is
///   too small for the standard deviation to be representable
pub fn normalize(signal: &[f64]) -> Result<Vec<f64>> {
    let first = *signal.first().ok_or(AlignmentError::EmptySignal)?;

    if signal.iter().all(|&x| x == first) {
        return Err(AlignmentError::DegenerateSignal { value: first });
    }

    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;
    let variance = signal.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return Err(AlignmentError::DegenerateSignal { value: first });
    }

    Ok(signal.iter().map(|&x| (x - mean) / std_dev).collect())
}
