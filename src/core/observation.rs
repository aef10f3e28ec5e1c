//! A single day of billed cost for one service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of a billing table.
///
/// `usage` is carried through detection untouched; only `cost` is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostObservation {
    pub date: NaiveDate,
    pub cost: f64,
    #[serde(default)]
    pub usage: f64,
    pub service: String,
}

impl CostObservation {
    pub fn new(date: NaiveDate, cost: f64, usage: f64, service: impl Into<String>) -> Self {
        Self {
            date,
            cost,
            usage,
            service: service.into(),
        }
    }
}

/// Extract the cost column of a series.
pub(crate) fn costs(series: &[CostObservation]) -> Vec<f64> {
    series.iter().map(|o| o.cost).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_missing_usage() {
        let json = r#"{"date":"2024-03-01","cost":12.5,"service":"compute"}"#;
        let obs: CostObservation = serde_json::from_str(json).unwrap();

        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(obs.cost, 12.5);
        assert_eq!(obs.usage, 0.0);
        assert_eq!(obs.service, "compute");
    }

    #[test]
    fn costs_preserves_order() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let series = vec![
            CostObservation::new(day(1), 3.0, 1.0, "s3"),
            CostObservation::new(day(2), 1.0, 1.0, "s3"),
            CostObservation::new(day(3), 2.0, 1.0, "s3"),
        ];
        assert_eq!(costs(&series), vec![3.0, 1.0, 2.0]);
    }
}
