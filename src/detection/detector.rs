//! Spike, drop and drift annotation of a single service's cost series.

use tracing::{debug, trace, warn};

use crate::core::observation::costs;
use crate::core::{AnnotatedObservation, AnomalyKind, CostObservation};
use crate::error::{DetectionError, Result};
use crate::seasonality::{STLResult, STL};

use super::drift::{scan_drift, DriftScan, DEFAULT_DRIFT_SIGMA, DEFAULT_DRIFT_WINDOW};
use super::outlier::{scan_residuals, TukeyFences, DEFAULT_FENCE_MULTIPLIER};

/// Weekly seasonality of daily billing data.
pub const SEASONAL_PERIOD: usize = 7;

/// Shortest series that is scanned at all; shorter series are returned
/// without annotations.
pub const MIN_HISTORY: usize = 7;

/// Tunable thresholds of the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Tukey multiplier on the residual IQR.
    pub fence_multiplier: f64,
    /// Trailing window of the drift rolling mean.
    pub drift_window: usize,
    /// Standard deviations above the mean slope that count as drift.
    pub drift_sigma: f64,
    /// Robustness passes of the STL fit; 15 is the usual robust STL default.
    pub robust_iterations: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            fence_multiplier: DEFAULT_FENCE_MULTIPLIER,
            drift_window: DEFAULT_DRIFT_WINDOW,
            drift_sigma: DEFAULT_DRIFT_SIGMA,
            robust_iterations: 15,
        }
    }
}

impl DetectorConfig {
    pub fn with_fence_multiplier(mut self, multiplier: f64) -> Self {
        self.fence_multiplier = multiplier;
        self
    }

    pub fn with_drift_window(mut self, window: usize) -> Self {
        self.drift_window = window;
        self
    }

    pub fn with_drift_sigma(mut self, sigma: f64) -> Self {
        self.drift_sigma = sigma;
        self
    }

    pub fn with_robust_iterations(mut self, n: usize) -> Self {
        self.robust_iterations = n;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fence_multiplier.is_finite() && self.fence_multiplier > 0.0) {
            return Err(DetectionError::InvalidParameter(format!(
                "fence multiplier must be positive, got {}",
                self.fence_multiplier
            )));
        }
        if self.drift_window == 0 {
            return Err(DetectionError::InvalidParameter(
                "drift window must be positive".to_string(),
            ));
        }
        if !(self.drift_sigma.is_finite() && self.drift_sigma >= 0.0) {
            return Err(DetectionError::InvalidParameter(format!(
                "drift sigma must be non-negative, got {}",
                self.drift_sigma
            )));
        }
        Ok(())
    }
}

/// Full output of one detector run.
///
/// The decomposition and drift scan are kept so charts can draw the same
/// trend lines the detector scored against.
#[derive(Debug, Clone)]
pub struct Detection {
    pub rows: Vec<AnnotatedObservation>,
    /// `None` when the series was shorter than [`MIN_HISTORY`].
    pub decomposition: Option<STLResult>,
    pub fences: Option<TukeyFences>,
    pub drift: Option<DriftScan>,
}

impl Detection {
    fn unscanned(series: &[CostObservation]) -> Self {
        Self {
            rows: series.iter().cloned().map(AnnotatedObservation::unflagged).collect(),
            decomposition: None,
            fences: None,
            drift: None,
        }
    }

    pub fn anomaly_count(&self) -> usize {
        self.rows.iter().filter(|r| r.anomaly_any()).count()
    }

    /// Flagged rows in input order.
    pub fn anomalies(&self) -> impl Iterator<Item = &AnnotatedObservation> {
        self.rows.iter().filter(|r| r.anomaly_any())
    }
}

/// Cost anomaly detector.
///
/// # Example
/// ```
/// use chrono::{Duration, NaiveDate};
/// use finops_anomaly::core::CostObservation;
/// use finops_anomaly::detection::AnomalyDetector;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let series: Vec<CostObservation> = (0..30)
///     .map(|i| {
///         let cost = if i == 15 { 500.0 } else { 100.0 };
///         CostObservation::new(start + Duration::days(i), cost, 1.0, "compute")
///     })
///     .collect();
///
/// let rows = AnomalyDetector::default().detect(&series).unwrap();
/// assert_eq!(rows.len(), 30);
/// assert!(rows[15].anomaly_type().unwrap().starts_with("spike"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Annotate every row of a date-sorted, single-service series.
    pub fn detect(&self, series: &[CostObservation]) -> Result<Vec<AnnotatedObservation>> {
        self.analyze(series).map(|d| d.rows)
    }

    /// Like [`detect`](Self::detect), also returning the shared
    /// decomposition and scan details.
    pub fn analyze(&self, series: &[CostObservation]) -> Result<Detection> {
        if series.len() < MIN_HISTORY {
            debug!(
                rows = series.len(),
                min_history = MIN_HISTORY,
                "series shorter than minimum history, skipping scan"
            );
            return Ok(Detection::unscanned(series));
        }

        let values = costs(series);
        let decomposition = self.decompose(&values)?;
        let mut detection = Detection::unscanned(series);

        let outliers = scan_residuals(&decomposition.remainder, self.config.fence_multiplier)?;
        debug!(
            q1 = outliers.fences.q1,
            q3 = outliers.fences.q3,
            lower = outliers.fences.lower,
            upper = outliers.fences.upper,
            "residual fences"
        );
        for (row, flag) in detection.rows.iter_mut().zip(&outliers.flags) {
            if let Some(kind) = flag {
                row.tags.insert(*kind);
                trace!(date = %row.date(), cost = row.cost(), kind = %kind, "level anomaly");
            }
        }

        let drift = scan_drift(&values, self.config.drift_window, self.config.drift_sigma);
        debug!(threshold = ?drift.threshold, "drift threshold");
        for (row, &is_drift) in detection.rows.iter_mut().zip(&drift.flags) {
            if is_drift {
                row.tags.insert(AnomalyKind::Drift);
                trace!(date = %row.date(), cost = row.cost(), "drift anomaly");
            }
        }

        debug!(
            rows = series.len(),
            level = outliers.outlier_count(),
            drift = drift.drift_count(),
            "cost series annotated"
        );

        detection.decomposition = Some(decomposition);
        detection.fences = Some(outliers.fences);
        detection.drift = Some(drift);
        Ok(detection)
    }

    /// Robust weekly STL of the cost values.
    ///
    /// Every failure of the fit surfaces as
    /// [`DetectionError::DecompositionFailure`].
    pub fn decompose(&self, values: &[f64]) -> Result<STLResult> {
        STL::new(SEASONAL_PERIOD)
            .with_outer_iterations(self.config.robust_iterations)
            .decompose(values)
            .map_err(|err| {
                warn!(rows = values.len(), error = %err, "cost decomposition failed");
                if matches!(err, DetectionError::DecompositionFailure(_)) {
                    err
                } else {
                    DetectionError::DecompositionFailure(err.to_string())
                }
            })
    }
}

/// Annotate a series with the default configuration.
pub fn detect(series: &[CostObservation]) -> Result<Vec<AnnotatedObservation>> {
    AnomalyDetector::default().detect(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series_from(costs: &[f64]) -> Vec<CostObservation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        costs
            .iter()
            .enumerate()
            .map(|(i, &c)| CostObservation::new(start + Duration::days(i as i64), c, 2.0, "compute"))
            .collect()
    }

    fn flat_with(index: usize, value: f64) -> Vec<CostObservation> {
        let mut costs = vec![100.0; 30];
        costs[index] = value;
        series_from(&costs)
    }

    #[test]
    fn short_series_is_returned_unflagged() {
        let series = series_from(&[5.0, 900.0, 1.0, 300.0, 2.0, 7.0]);
        let detection = AnomalyDetector::default().analyze(&series).unwrap();

        assert_eq!(detection.rows.len(), 6);
        assert_eq!(detection.anomaly_count(), 0);
        assert!(detection.decomposition.is_none());
        assert!(detection.drift.is_none());
    }

    #[test]
    fn under_two_weeks_is_annotated() {
        let series =
            series_from(&[100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 500.0, 101.0, 99.0, 100.0]);
        let detection = AnomalyDetector::default().analyze(&series).unwrap();

        assert_eq!(detection.rows.len(), 10);
        assert!(detection.decomposition.is_some());
        assert!(detection.drift.is_some());

        let week = AnomalyDetector::default().analyze(&series[..MIN_HISTORY]).unwrap();
        assert_eq!(week.rows.len(), MIN_HISTORY);
        assert!(week.decomposition.is_some());
    }

    #[test]
    fn non_finite_cost_is_a_decomposition_failure() {
        let mut costs = vec![100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 97.0, 101.0];
        costs[4] = f64::NAN;
        let err = detect(&series_from(&costs)).unwrap_err();
        assert_eq!(
            err,
            DetectionError::DecompositionFailure("non-finite value at index 4".to_string())
        );
    }

    #[test]
    fn constant_series_is_a_decomposition_failure() {
        let err = detect(&series_from(&[80.0; 21])).unwrap_err();
        assert!(matches!(err, DetectionError::DecompositionFailure(_)));
    }

    #[test]
    fn spike_day_is_flagged() {
        let detection = AnomalyDetector::default()
            .analyze(&flat_with(15, 500.0))
            .unwrap();

        let row = &detection.rows[15];
        assert!(row.anomaly_any());
        assert_eq!(row.tags.level(), Some(AnomalyKind::Spike));
        assert!(detection.decomposition.is_some());
        assert!(detection.fences.is_some());
    }

    #[test]
    fn dip_day_is_flagged_as_drop() {
        let rows = detect(&flat_with(15, 5.0)).unwrap();
        assert_eq!(rows[15].tags.level(), Some(AnomalyKind::Drop));
        assert!(!rows[15].tags.contains(AnomalyKind::Spike));
    }

    #[test]
    fn spike_that_lifts_the_mean_is_compound() {
        let rows = detect(&flat_with(15, 500.0)).unwrap();

        assert_eq!(rows[15].anomaly_type().as_deref(), Some("spike + drift"));
        assert_eq!(
            rows[15].explanation().unwrap(),
            format!(
                "{} | {}",
                AnomalyKind::Spike.explanation(),
                AnomalyKind::Drift.explanation()
            )
        );
    }

    #[test]
    fn rows_keep_order_and_payload() {
        let series = flat_with(20, 450.0);
        let rows = detect(&series).unwrap();

        assert_eq!(rows.len(), series.len());
        for (row, obs) in rows.iter().zip(&series) {
            assert_eq!(&row.observation, obs);
        }
    }

    #[test]
    fn config_validation() {
        assert!(DetectorConfig::default().validate().is_ok());
        assert!(AnomalyDetector::new(DetectorConfig::default().with_drift_window(0)).is_err());
        assert!(AnomalyDetector::new(DetectorConfig::default().with_fence_multiplier(0.0)).is_err());
        assert!(AnomalyDetector::new(DetectorConfig::default().with_drift_sigma(f64::NAN)).is_err());

        assert_eq!(DetectorConfig::default().robust_iterations, 15);
        let detector = AnomalyDetector::new(
            DetectorConfig::default()
                .with_fence_multiplier(3.0)
                .with_robust_iterations(2),
        )
        .unwrap();
        assert_eq!(detector.config().fence_multiplier, 3.0);
        assert_eq!(detector.config().robust_iterations, 2);
    }

    #[test]
    fn decomposition_is_shared_with_callers() {
        let series = flat_with(15, 500.0);
        let detector = AnomalyDetector::default();

        let detection = detector.analyze(&series).unwrap();
        let again = detector.decompose(&costs(&series)).unwrap();

        assert_eq!(detection.decomposition.unwrap(), again);
    }
}
