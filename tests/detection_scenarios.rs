//! End-to-end scenarios over realistic daily billing series.

use chrono::{Duration, NaiveDate};
use finops_anomaly::core::table::partition_by_service;
use finops_anomaly::core::{AnomalyKind, CostObservation};
use finops_anomaly::detection::{detect, AnomalyDetector};
use finops_anomaly::report::{summarize, NO_ANOMALIES};
use finops_anomaly::DetectionError;

fn daily(service: &str, costs: &[f64]) -> Vec<CostObservation> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    costs
        .iter()
        .enumerate()
        .map(|(i, &c)| CostObservation::new(start + Duration::days(i as i64), c, c / 10.0, service))
        .collect()
}

fn flat_with(index: usize, value: f64) -> Vec<f64> {
    let mut costs = vec![100.0; 30];
    costs[index] = value;
    costs
}

#[test]
fn single_spike_on_flat_series() {
    let rows = detect(&daily("compute", &flat_with(12, 500.0))).unwrap();

    assert!(rows[12].anomaly_any());
    assert!(rows[12].tags.contains(AnomalyKind::Spike));
    assert!(rows[12].anomaly_type().unwrap().starts_with("spike"));
}

#[test]
fn single_dip_on_flat_series() {
    let rows = detect(&daily("compute", &flat_with(15, 5.0))).unwrap();

    assert!(rows[15].anomaly_any());
    assert_eq!(rows[15].tags.level(), Some(AnomalyKind::Drop));
    assert!(rows[15].anomaly_type().unwrap().starts_with("drop"));
}

#[test]
fn late_ramp_is_drift_once_weekly_mean_catches_up() {
    // Flat for three weeks, then +20/day for the final week.
    let costs: Vec<f64> = (0..30)
        .map(|i| if i < 23 { 100.0 } else { 100.0 + 20.0 * (i - 22) as f64 })
        .collect();

    let rows = detect(&daily("analytics", &costs)).unwrap();

    assert!(rows[28].tags.has_drift());
    assert!(rows[29].tags.has_drift());
    assert!(rows[..23].iter().all(|r| !r.tags.has_drift()));
}

#[test]
fn five_days_are_never_flagged() {
    let rows = detect(&daily("cdn", &[10.0, 9000.0, 0.0, 55.0, 1.0])).unwrap();

    assert_eq!(rows.len(), 5);
    for row in &rows {
        assert!(!row.anomaly_any());
        assert_eq!(row.anomaly_type(), None);
        assert_eq!(row.explanation(), None);
    }
    assert_eq!(summarize(&rows), NO_ANOMALIES);
}

#[test]
fn spike_and_drift_on_the_same_day_merge() {
    let rows = detect(&daily("compute", &flat_with(15, 500.0))).unwrap();
    let row = &rows[15];

    assert_eq!(row.anomaly_type().as_deref(), Some("spike + drift"));
    let explanation = row.explanation().unwrap();
    let (first, second) = explanation.split_once(" | ").unwrap();
    assert_eq!(first, AnomalyKind::Spike.explanation());
    assert_eq!(second, AnomalyKind::Drift.explanation());
}

#[test]
fn spike_on_top_of_weekly_pattern() {
    // Weekend costs are lower every week; the spike sits on a Wednesday.
    let mut costs: Vec<f64> = (0..42)
        .map(|i| if i % 7 >= 5 { 60.0 } else { 100.0 + (i % 7) as f64 })
        .collect();
    costs[30] = 400.0;

    let rows = detect(&daily("compute", &costs)).unwrap();

    assert_eq!(rows[30].tags.level(), Some(AnomalyKind::Spike));
    assert!(rows.iter().all(|r| !(r.tags.contains(AnomalyKind::Spike)
        && r.tags.contains(AnomalyKind::Drop))));
}

#[test]
fn decomposition_failures_surface() {
    let constant = detect(&daily("idle", &[0.0; 30])).unwrap_err();
    assert!(matches!(constant, DetectionError::DecompositionFailure(_)));

    let mut gap = flat_with(10, 180.0);
    gap[4] = f64::INFINITY;
    let missing = detect(&daily("gap", &gap));
    assert!(matches!(missing, Err(DetectionError::DecompositionFailure(_))));
}

#[test]
fn new_service_is_scored_from_its_first_week() {
    let costs = [100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 500.0, 101.0, 99.0, 100.0];

    for n in 7..=costs.len() {
        let rows = detect(&daily("new", &costs[..n])).unwrap();
        assert_eq!(rows.len(), n);
        for row in &rows {
            assert_eq!(row.anomaly_any(), row.anomaly_type().is_some());
        }
    }
}

#[test]
fn billing_table_to_summary() {
    let mut table = daily("compute", &flat_with(15, 500.0));
    table.extend(daily("storage", &[20.0, 21.0, 22.0]));
    table.reverse();

    let per_service = partition_by_service(table).unwrap();
    assert_eq!(per_service.len(), 2);

    let compute = detect(&per_service["compute"]).unwrap();
    let summary = summarize(&compute);
    assert!(summary
        .lines()
        .any(|l| l.starts_with("Date: 2024-01-16, Cost: 500.0, Types: spike + drift")));

    let storage = AnomalyDetector::default()
        .detect(&per_service["storage"])
        .unwrap();
    assert_eq!(summarize(&storage), NO_ANOMALIES);
}
