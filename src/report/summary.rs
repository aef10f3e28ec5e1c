//! Plain-text digest of flagged days, used as the prompt body of the
//! anomaly summariser.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::core::{AnnotatedObservation, EXPLANATION_SEPARATOR, TYPE_SEPARATOR};

/// Digest returned when nothing was flagged.
pub const NO_ANOMALIES: &str = "No anomalies detected for this service.";

/// Flagged rows collapsed to one entry per date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAnomaly {
    pub date: NaiveDate,
    /// Cost of the first flagged row on this date.
    pub cost: f64,
    /// Sorted, unique `anomaly_type` values joined with `" + "`.
    pub types: String,
    /// Sorted, unique explanations joined with `" | "`.
    pub context: String,
}

impl DailyAnomaly {
    /// Costs print in shortest round-trip form, always with a decimal
    /// point (`500.0`, `95.5`).
    pub fn to_line(&self) -> String {
        format!(
            "Date: {}, Cost: {:?}, Types: {}, Context: {}",
            self.date.format("%Y-%m-%d"),
            self.cost,
            self.types,
            self.context
        )
    }
}

#[derive(Default)]
struct DayGroup {
    cost: Option<f64>,
    types: BTreeSet<String>,
    context: BTreeSet<String>,
}

/// Group flagged rows by date, ascending.
pub fn group_by_date<'a, I>(rows: I) -> Vec<DailyAnomaly>
where
    I: IntoIterator<Item = &'a AnnotatedObservation>,
{
    let mut days: BTreeMap<NaiveDate, DayGroup> = BTreeMap::new();

    for row in rows.into_iter().filter(|r| r.anomaly_any()) {
        let day = days.entry(row.date()).or_default();
        day.cost.get_or_insert(row.cost());
        day.types.extend(row.anomaly_type());
        day.context.extend(row.explanation());
    }

    days.into_iter()
        .map(|(date, day)| DailyAnomaly {
            date,
            cost: day.cost.unwrap_or_default(),
            types: join(&day.types, TYPE_SEPARATOR),
            context: join(&day.context, EXPLANATION_SEPARATOR),
        })
        .collect()
}

/// One line per flagged date, or [`NO_ANOMALIES`].
pub fn summarize(rows: &[AnnotatedObservation]) -> String {
    let days = group_by_date(rows);
    if days.is_empty() {
        return NO_ANOMALIES.to_string();
    }
    days.iter()
        .map(DailyAnomaly::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn join(parts: &BTreeSet<String>, separator: &str) -> String {
    parts.iter().map(String::as_str).collect::<Vec<_>>().join(separator)
}
