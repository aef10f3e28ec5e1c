//! Anomaly detection over a single service's daily cost series.
//!
//! Two scans run over the same input:
//! - residual outliers of a robust weekly STL (spike / drop)
//! - slope of a trailing weekly mean (drift)

mod detector;
mod drift;
mod outlier;

pub use detector::{
    detect, AnomalyDetector, Detection, DetectorConfig, MIN_HISTORY, SEASONAL_PERIOD,
};
pub use drift::{scan_drift, DriftScan, DEFAULT_DRIFT_SIGMA, DEFAULT_DRIFT_WINDOW};
pub use outlier::{scan_residuals, OutlierScan, TukeyFences, DEFAULT_FENCE_MULTIPLIER};
