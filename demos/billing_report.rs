//! Billing anomaly report example.
//!
//! Run with: RUST_LOG=finops_anomaly=debug cargo run --example billing_report

use chrono::{Duration, NaiveDate};
use finops_anomaly::core::table::partition_by_service;
use finops_anomaly::core::CostObservation;
use finops_anomaly::prelude::*;
use finops_anomaly::report::anomaly_table;
use tracing_subscriber::EnvFilter;

fn synthetic_billing(days: i64) -> Vec<CostObservation> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut rows = Vec::new();

    for d in 0..days {
        let date = start + Duration::days(d);
        let weekday_load = if d % 7 >= 5 { 0.7 } else { 1.0 };

        // Compute: weekly pattern with an auto-scaling burst on day 40.
        let burst = if d == 40 { 900.0 } else { 0.0 };
        rows.push(CostObservation::new(
            date,
            400.0 * weekday_load + burst,
            120.0 * weekday_load,
            "compute",
        ));

        // Storage: flat, then steady growth over the final ten days.
        let growth = if d >= days - 10 { 35.0 * (d - (days - 11)) as f64 } else { 0.0 };
        rows.push(CostObservation::new(date, 150.0 + growth + (d % 3) as f64, 2048.0, "storage"));

        // Database: decommissioned replica on day 60.
        let cost = if d == 60 { 20.0 } else { 250.0 + (d % 5) as f64 };
        rows.push(CostObservation::new(date, cost, 64.0, "database"));
    }

    // A brand-new service with a few days of history and one missing cost.
    for d in 0..4 {
        let cost = if d == 2 { f64::NAN } else { 12.0 };
        rows.push(CostObservation::new(start + Duration::days(d), cost, 1.0, ""));
    }

    rows
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Billing Anomaly Report ===\n");

    let detector = AnomalyDetector::default();
    for (service, series) in partition_by_service(synthetic_billing(90))? {
        println!("--- {} ({} days) ---", service, series.len());

        let detection = match detector.analyze(&series) {
            Ok(detection) => detection,
            Err(err) => {
                println!("  no chart available for this service: {}\n", err);
                continue;
            }
        };

        let chart = ChartData::from_detection(&detection);
        for (label, points) in &chart.markers {
            println!("  {:<15} {} point(s)", label, points.len());
        }

        println!("\n{}\n", summarize(&detection.rows));

        for row in anomaly_table(&detection.rows).iter().take(3) {
            match serde_json::to_string(row) {
                Ok(json) => println!("  {}", json),
                Err(err) => println!("  could not serialize row: {}", err),
            }
        }
        println!();
    }

    Ok(())
}
