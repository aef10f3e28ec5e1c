//! Spike and drop classification of decomposition residuals.
//!
//! Residuals are scored against Tukey fences derived from the residuals
//! themselves, so weekly and trend-normal variation never trips them.

use crate::core::AnomalyKind;
use crate::error::{DetectionError, Result};
use crate::utils::stats::quantile_sorted;

/// Standard Tukey multiplier.
pub const DEFAULT_FENCE_MULTIPLIER: f64 = 1.5;

/// Tukey fences `Q1 - k*IQR` and `Q3 + k*IQR`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TukeyFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl TukeyFences {
    /// Build fences from quartiles (linear interpolation) of `residuals`.
    ///
    /// Returns `None` for an empty input.
    pub fn from_residuals(residuals: &[f64], multiplier: f64) -> Option<Self> {
        if residuals.is_empty() {
            return None;
        }
        let mut sorted = residuals.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Strict comparison: a residual sitting exactly on a fence is normal.
    ///
    /// With `IQR == 0` the fences collapse onto the quartiles and any
    /// residual outside them is flagged.
    pub fn classify(&self, residual: f64) -> Option<AnomalyKind> {
        if residual > self.upper {
            Some(AnomalyKind::Spike)
        } else if residual < self.lower {
            Some(AnomalyKind::Drop)
        } else {
            None
        }
    }
}

/// Result of scanning a residual series.
#[derive(Debug, Clone)]
pub struct OutlierScan {
    pub fences: TukeyFences,
    /// Level category per residual, aligned with the input.
    pub flags: Vec<Option<AnomalyKind>>,
}

impl OutlierScan {
    pub fn outlier_count(&self) -> usize {
        self.flags.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_outlier(&self, index: usize) -> bool {
        self.flags.get(index).is_some_and(|f| f.is_some())
    }
}

/// Classify every residual against fences computed over the whole series.
pub fn scan_residuals(residuals: &[f64], multiplier: f64) -> Result<OutlierScan> {
    let fences = TukeyFences::from_residuals(residuals, multiplier).ok_or(
        DetectionError::InsufficientData {
            needed: 1,
            got: 0,
        },
    )?;
    let flags = residuals.iter().map(|&r| fences.classify(r)).collect();

    Ok(OutlierScan { fences, flags })
}
