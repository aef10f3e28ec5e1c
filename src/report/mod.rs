//! Consumers of an annotated series: the anomaly digest and chart data.

pub mod chart;
pub mod summary;

pub use chart::{anomaly_table, AnomalyRow, ChartData, ChartPoint};
pub use summary::{group_by_date, summarize, DailyAnomaly, NO_ANOMALIES};
