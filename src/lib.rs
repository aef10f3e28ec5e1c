//! # finops-anomaly
//!
//! Spike, drop and drift detection for daily cloud cost series.
//!
//! A service's cost series is decomposed with a robust weekly STL; Tukey
//! fences on the residuals flag spikes and drops, and a self-normalising
//! slope threshold on a 7-day trailing mean flags sustained upward drift.
//! Every input row comes back annotated, in order.
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use finops_anomaly::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series: Vec<CostObservation> = (0..28)
//!     .map(|i| {
//!         let cost = if i == 20 { 3.0 } else { 120.0 + (i % 7) as f64 };
//!         CostObservation::new(start + Duration::days(i), cost, 1.0, "storage")
//!     })
//!     .collect();
//!
//! let rows = detect(&series)?;
//! assert_eq!(rows.len(), series.len());
//! println!("{}", summarize(&rows));
//! # Ok::<(), finops_anomaly::DetectionError>(())
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod detection;
pub mod error;
pub mod report;
pub mod seasonality;
pub mod transform;
pub mod utils;

pub use error::{DetectionError, Result};

pub mod prelude {
    pub use crate::core::{AnnotatedObservation, AnomalyKind, AnomalyTags, CostObservation};
    pub use crate::detection::{detect, AnomalyDetector, Detection, DetectorConfig};
    pub use crate::error::{DetectionError, Result};
    pub use crate::report::{summarize, ChartData};
}
