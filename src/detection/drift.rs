//! Sustained upward drift in a trailing rolling mean.
//!
//! The slope of a 7-day trailing mean is compared with
//! `mean(slope) + sigma * sd(slope)` computed over the same series. The bar
//! therefore rises with the volatility of the series: a flat series trips on
//! any modest increase, a noisy one needs a much steeper climb.

use crate::transform::{diff, rolling_mean};
use crate::utils::stats::{mean, std_dev};

/// Trailing window of the drift mean.
pub const DEFAULT_DRIFT_WINDOW: usize = 7;
/// Standard deviations above the mean slope.
pub const DEFAULT_DRIFT_SIGMA: f64 = 2.0;

/// Result of a drift scan.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftScan {
    /// Trailing rolling mean; `None` until a full window is available.
    pub rolling_mean: Vec<Option<f64>>,
    /// First difference of the rolling mean.
    pub slope: Vec<Option<f64>>,
    /// `None` when fewer than two slopes are defined.
    pub threshold: Option<f64>,
    /// Rows whose slope exceeds the threshold.
    pub flags: Vec<bool>,
}

impl DriftScan {
    pub fn drift_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    pub fn is_drift(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }
}

/// Scan `costs` for drift.
///
/// The slope standard deviation is the sample (n - 1) estimate over the
/// defined slopes only.
pub fn scan_drift(costs: &[f64], window: usize, sigma: f64) -> DriftScan {
    let means = rolling_mean(costs, window);
    let slopes = diff(&means);

    let defined: Vec<f64> = slopes.iter().copied().filter(|s| !s.is_nan()).collect();
    let threshold = if defined.len() >= 2 {
        Some(mean(&defined) + sigma * std_dev(&defined))
    } else {
        None
    };

    let flags = slopes
        .iter()
        .map(|&s| threshold.is_some_and(|t| s > t))
        .collect();

    DriftScan {
        rolling_mean: means.into_iter().map(defined_value).collect(),
        slope: slopes.into_iter().map(defined_value).collect(),
        threshold,
        flags,
    }
}

fn defined_value(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}
