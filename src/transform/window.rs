//! Rolling window functions used by the drift scan and trend overlays.

/// Compute a trailing rolling mean.
///
/// Positions without a full window (the first `window - 1` values) are NaN,
/// matching the usual rolling-window convention.
///
/// # Arguments
/// * `series` - Input cost series
/// * `window` - Window size
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let n = series.len();
    let mut result = vec![f64::NAN; n];

    for i in (window - 1)..n {
        let start = i + 1 - window;
        let sum: f64 = series[start..=i].iter().sum();
        result[i] = sum / window as f64;
    }

    result
}

/// First difference: `out[i] = series[i] - series[i - 1]`.
///
/// The first position, and any position next to a NaN, is NaN.
pub fn diff(series: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; series.len()];
    for i in 1..series.len() {
        result[i] = series[i] - series[i - 1];
    }
    result
}
