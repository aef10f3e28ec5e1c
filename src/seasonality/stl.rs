//! STL (Seasonal-Trend decomposition using LOESS) implementation.
//!
//! STL decomposes a cost series into three additive components:
//! - Trend: the slowly moving baseline
//! - Seasonal: the repeating weekly pattern
//! - Remainder: what is left after removing trend and seasonal
//!
//! Robust fitting reweights observations by their remainder (bisquare on
//! six times the median absolute remainder) so that a single extreme day
//! does not drag the baseline it is later scored against.

use crate::error::{DetectionError, Result};
use crate::utils::stats::median;

/// Result of STL decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct STLResult {
    /// Trend component.
    pub trend: Vec<f64>,
    /// Seasonal component.
    pub seasonal: Vec<f64>,
    /// Remainder component.
    pub remainder: Vec<f64>,
}

impl STLResult {
    /// Number of decomposed observations.
    pub fn len(&self) -> usize {
        self.trend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trend.is_empty()
    }
}

/// STL decomposition configuration and algorithm.
#[derive(Debug, Clone)]
pub struct STL {
    /// Seasonal period.
    seasonal_period: usize,
    /// Seasonal LOESS span (ns), odd.
    seasonal_smoothness: usize,
    /// Trend LOESS span (nt), odd.
    trend_smoothness: usize,
    /// Low-pass LOESS span (nl), odd.
    low_pass_smoothness: usize,
    inner_iterations: usize,
    /// Robustness iterations; zero disables reweighting.
    outer_iterations: usize,
}

impl STL {
    /// Create a new STL decomposer with the given seasonal period.
    pub fn new(seasonal_period: usize) -> Self {
        // Cleveland et al. (1990) defaults
        let period = seasonal_period.max(2) as f64;
        let nt = (1.5 * period / (1.0 - 1.5 / period)).ceil() as usize;

        Self {
            seasonal_period,
            seasonal_smoothness: make_odd(seasonal_period),
            trend_smoothness: make_odd(nt),
            low_pass_smoothness: make_odd(seasonal_period),
            inner_iterations: 2,
            outer_iterations: 0,
        }
    }

    /// Enable robust fitting with fifteen reweighting passes.
    pub fn robust(self) -> Self {
        self.with_outer_iterations(15)
    }

    /// Set number of outer (robustness) iterations.
    pub fn with_outer_iterations(mut self, n: usize) -> Self {
        self.outer_iterations = n;
        self
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn is_robust(&self) -> bool {
        self.outer_iterations > 0
    }

    /// Decompose the series.
    ///
    /// Requires one complete seasonal cycle of finite, non-constant values.
    /// Phases with a single observation are carried by the subseries smoother.
    pub fn decompose(&self, series: &[f64]) -> Result<STLResult> {
        let n = series.len();
        if self.seasonal_period < 2 {
            return Err(DetectionError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        if n < self.seasonal_period {
            return Err(DetectionError::InsufficientData {
                needed: self.seasonal_period,
                got: n,
            });
        }
        if let Some(i) = series.iter().position(|v| !v.is_finite()) {
            return Err(DetectionError::DecompositionFailure(format!(
                "non-finite value at index {}",
                i
            )));
        }
        if series.iter().all(|&v| v == series[0]) {
            return Err(DetectionError::DecompositionFailure(
                "constant series has no seasonal or residual structure".to_string(),
            ));
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        for pass in 0..=self.outer_iterations {
            if pass > 0 {
                let remainder = remainder_of(series, &seasonal, &trend);
                weights = bisquare_weights(&remainder);
            }

            for _ in 0..self.inner_iterations {
                let detrended: Vec<f64> =
                    series.iter().zip(&trend).map(|(y, t)| y - t).collect();

                let cycle = self.smooth_cycle_subseries(&detrended, &weights);
                let low_pass = self.low_pass_filter(&cycle);
                for i in 0..n {
                    seasonal[i] = cycle[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> =
                    series.iter().zip(&seasonal).map(|(y, s)| y - s).collect();
                trend = tricube_smooth(&deseasonalized, self.trend_smoothness, &weights);
            }
        }

        let remainder = remainder_of(series, &seasonal, &trend);
        if remainder.iter().chain(&trend).any(|v| !v.is_finite()) {
            return Err(DetectionError::DecompositionFailure(
                "decomposition produced non-finite components".to_string(),
            ));
        }

        Ok(STLResult {
            trend,
            seasonal,
            remainder,
        })
    }

    /// Smooth each cycle-subseries (all Mondays, all Tuesdays, ...) separately.
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let mut result = vec![0.0; detrended.len()];

        for phase in 0..period {
            let indices: Vec<usize> = (phase..detrended.len()).step_by(period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let sub_weights: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = tricube_smooth(&values, self.seasonal_smoothness, &sub_weights);
            for (&idx, value) in indices.iter().zip(smoothed) {
                result[idx] = value;
            }
        }

        result
    }

    /// MA(period), MA(period), MA(3), then LOESS.
    fn low_pass_filter(&self, series: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let ma = centered_moving_average(series, period);
        let ma = centered_moving_average(&ma, period);
        let ma = centered_moving_average(&ma, 3);

        let weights = vec![1.0; series.len()];
        tricube_smooth(&ma, self.low_pass_smoothness, &weights)
    }
}

impl Default for STL {
    fn default() -> Self {
        Self::new(7)
    }
}

fn make_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

fn remainder_of(series: &[f64], seasonal: &[f64], trend: &[f64]) -> Vec<f64> {
    series
        .iter()
        .zip(seasonal)
        .zip(trend)
        .map(|((y, s), t)| y - s - t)
        .collect()
}

/// Locally weighted mean with a tricube kernel over `span` neighbours.
fn tricube_smooth(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    let half_span = span / 2;
    let max_dist = half_span as f64 + 1.0;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half_span);
            let end = (i + half_span + 1).min(n);

            let mut sum_weights = 0.0;
            let mut sum_values = 0.0;
            for j in start..end {
                let u = i.abs_diff(j) as f64 / max_dist;
                let w = (1.0 - u.powi(3)).powi(3) * weights[j];
                sum_weights += w;
                sum_values += w * values[j];
            }

            if sum_weights > 0.0 {
                sum_values / sum_weights
            } else {
                values[i]
            }
        })
        .collect()
}

/// Centered moving average, shrinking the window at the edges.
fn centered_moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let half = window / 2;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            series[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

/// Bisquare robustness weights on `6 * median(|remainder|)`.
fn bisquare_weights(remainder: &[f64]) -> Vec<f64> {
    let abs: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    let h = 6.0 * median(&abs);

    if h.is_nan() || h < 1e-10 {
        return vec![1.0; remainder.len()];
    }

    abs.iter()
        .map(|a| {
            let u = a / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}
