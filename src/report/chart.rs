//! Data behind the cost chart and the flagged-row table.
//!
//! Category strings are passed through as rendered by the detector
//! (including compound `"spike + drift"` labels); nothing here re-derives
//! a classification.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::AnnotatedObservation;
use crate::detection::Detection;

/// A single plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub cost: f64,
}

/// Series needed to draw one service's cost chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub dates: Vec<NaiveDate>,
    pub cost: Vec<f64>,
    /// STL trend the residuals were scored against.
    pub trend: Option<Vec<f64>>,
    /// Rolling mean used by the drift scan, present only when drift fired.
    pub drift_trend: Option<Vec<Option<f64>>>,
    /// Flagged points keyed by their `anomaly_type` label.
    pub markers: BTreeMap<String, Vec<ChartPoint>>,
}

impl ChartData {
    pub fn from_detection(detection: &Detection) -> Self {
        let rows = &detection.rows;

        let mut markers: BTreeMap<String, Vec<ChartPoint>> = BTreeMap::new();
        for row in rows {
            if let Some(label) = row.anomaly_type() {
                markers.entry(label).or_default().push(ChartPoint {
                    date: row.date(),
                    cost: row.cost(),
                });
            }
        }

        let any_drift = rows.iter().any(|r| r.tags.has_drift());
        let drift_trend = detection
            .drift
            .as_ref()
            .filter(|_| any_drift)
            .map(|scan| scan.rolling_mean.clone());

        Self {
            dates: rows.iter().map(AnnotatedObservation::date).collect(),
            cost: rows.iter().map(AnnotatedObservation::cost).collect(),
            trend: detection.decomposition.as_ref().map(|d| d.trend.clone()),
            drift_trend,
            markers,
        }
    }

    pub fn markers_for(&self, label: &str) -> &[ChartPoint] {
        self.markers.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One line of the flagged-row table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnomalyRow {
    pub date: NaiveDate,
    pub service: String,
    pub cost: f64,
    pub usage: f64,
    #[serde(rename = "Type")]
    pub anomaly_type: String,
}

/// Flagged rows in input order.
pub fn anomaly_table(rows: &[AnnotatedObservation]) -> Vec<AnomalyRow> {
    rows.iter()
        .filter_map(|row| {
            row.anomaly_type().map(|anomaly_type| AnomalyRow {
                date: row.observation.date,
                service: row.observation.service.clone(),
                cost: row.observation.cost,
                usage: row.observation.usage,
                anomaly_type,
            })
        })
        .collect()
}
