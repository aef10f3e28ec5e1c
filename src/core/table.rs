//! Billing table hygiene and per-service partitioning.
//!
//! The detector expects one service's rows, sorted by date, with numeric
//! costs. These helpers turn a raw multi-service billing table into that
//! shape.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DetectionError, Result};

use super::observation::CostObservation;

/// Service name used for rows that arrive without one.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Replace non-finite cost and usage with zero and fill blank service names.
pub fn sanitize(rows: &mut [CostObservation]) {
    for row in rows.iter_mut() {
        if !row.cost.is_finite() {
            row.cost = 0.0;
        }
        if !row.usage.is_finite() {
            row.usage = 0.0;
        }
        if row.service.trim().is_empty() {
            row.service = UNKNOWN_SERVICE.to_string();
        }
    }
}

/// Sorted, de-duplicated service names present in the table.
pub fn services(rows: &[CostObservation]) -> Vec<String> {
    rows.iter()
        .map(|r| r.service.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sanitize the table and split it into per-service series sorted by date.
///
/// Sorting is stable, so rows sharing a date keep their input order.
pub fn partition_by_service(
    mut rows: Vec<CostObservation>,
) -> Result<BTreeMap<String, Vec<CostObservation>>> {
    if rows.is_empty() {
        return Err(DetectionError::EmptyData);
    }
    sanitize(&mut rows);

    let mut groups: BTreeMap<String, Vec<CostObservation>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.service.clone()).or_default().push(row);
    }
    for series in groups.values_mut() {
        series.sort_by_key(|r| r.date);
    }

    Ok(groups)
}
