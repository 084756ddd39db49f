//! FFT-accelerated cross-correlation for audio lag detection.
//!
//! Computes the full cross-correlation between two waveforms, spanning
//! every possible lag from `-(len(b) - 1)` to `len(a) - 1`, and returns
//! the lag at the correlation peak. Ties resolve to the first occurrence
//! of the maximum.
//!
//! No signal-quality guard is applied: a degenerate or non-overlapping
//! pair still yields a lag. Callers that want to reject low-confidence
//! peaks can consult [`correlation_confidence`].

use rustfft::{num_complex::Complex, FftPlanner};

use super::types::{AnalysisError, AnalysisResult};

/// Cross-correlate two waveforms and return the lag, in samples, at the
/// point of maximum correlation.
///
/// A positive lag means `b`'s content leads `a`'s - the recorder behind
/// `b` started later in real time, so shared events sit earlier in its
/// file. The latest-starting camera therefore gets the largest lag
/// against a common reference, which is what lag normalization rebases
/// to zero.
pub fn cross_correlate(a: &[f64], b: &[f64]) -> AnalysisResult<isize> {
    let correlation = full_cross_correlation(a, b)?;

    let peak_index = argmax_first(&correlation);
    let min_lag = -(b.len() as isize - 1);

    Ok(min_lag + peak_index as isize)
}

/// Compute the full cross-correlation array.
///
/// Index `i` holds the correlation at lag `i - (len(b) - 1)`, so the
/// output has `len(a) + len(b) - 1` entries covering every overlap.
pub fn full_cross_correlation(a: &[f64], b: &[f64]) -> AnalysisResult<Vec<f64>> {
    if a.is_empty() || b.is_empty() {
        return Err(AnalysisError::InvalidSignal(
            "cannot correlate an empty signal".to_string(),
        ));
    }

    let correlation_len = a.len() + b.len() - 1;
    let fft_len = correlation_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let mut a_complex: Vec<Complex<f64>> = a.iter().map(|&x| Complex::new(x, 0.0)).collect();
    a_complex.resize(fft_len, Complex::new(0.0, 0.0));

    let mut b_complex: Vec<Complex<f64>> = b.iter().map(|&x| Complex::new(x, 0.0)).collect();
    b_complex.resize(fft_len, Complex::new(0.0, 0.0));

    fft.process(&mut a_complex);
    fft.process(&mut b_complex);

    // Correlation in the frequency domain: A * conj(B).
    let mut product: Vec<Complex<f64>> = a_complex
        .iter()
        .zip(b_complex.iter())
        .map(|(x, y)| x * y.conj())
        .collect();

    ifft.process(&mut product);

    let scale = 1.0 / fft_len as f64;

    // The circular result keeps lag k at index k, with negative lags
    // wrapped to the end. Unwrap into ascending lag order.
    let min_lag = -(b.len() as isize - 1);
    let full: Vec<f64> = (0..correlation_len)
        .map(|i| {
            let lag = min_lag + i as isize;
            let idx = if lag < 0 {
                (fft_len as isize + lag) as usize
            } else {
                lag as usize
            };
            product[idx].re * scale
        })
        .collect();

    Ok(full)
}

/// Peak-to-second-peak ratio of a correlation array.
///
/// The second peak is the largest value outside a small guard window
/// around the main peak. A ratio near 1.0 means the peak is not
/// distinguishable from the rest of the correlation (low confidence);
/// larger ratios mean a sharper, more trustworthy alignment.
pub fn correlation_confidence(correlation: &[f64]) -> f64 {
    const GUARD: usize = 16;

    if correlation.is_empty() {
        return 0.0;
    }

    let peak_index = argmax_first(correlation);
    let peak = correlation[peak_index];

    let second = correlation
        .iter()
        .enumerate()
        .filter(|(i, _)| i.abs_diff(peak_index) > GUARD)
        .map(|(_, &v)| v)
        .fold(f64::NEG_INFINITY, f64::max);

    if !second.is_finite() || second.abs() < f64::EPSILON {
        return 1.0;
    }

    (peak / second).abs()
}

/// Z-score normalization: zero mean, unit standard deviation.
///
/// Not applied on the default correlation path; available for callers
/// working with signals of very different loudness.
pub fn zscore(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    let std_dev = variance.sqrt();

    if std_dev < f64::EPSILON {
        return vec![0.0; samples.len()];
    }

    samples.iter().map(|x| (x - mean) / std_dev).collect()
}

/// Index of the maximum value, first occurrence on ties.
fn argmax_first(values: &[f64]) -> usize {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best_index = i;
        }
    }
    best_index
}
