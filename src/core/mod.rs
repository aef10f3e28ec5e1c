//! Core data structures for cost anomaly detection.

mod annotation;
pub(crate) mod observation;
pub mod table;

pub use annotation::{
    AnnotatedObservation, AnnotatedRecord, AnomalyKind, AnomalyTags, EXPLANATION_SEPARATOR,
    TYPE_SEPARATOR,
};
pub use observation::CostObservation;
