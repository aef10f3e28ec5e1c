//! Anomaly categories and per-row annotations.
//!
//! A row carries at most one level category (spike or drop) and an
//! independent drift flag. Categories are kept as tags and rendered to the
//! `"spike + drift"` style label only on demand, so the order in which the
//! scans run never changes the output.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::observation::CostObservation;

/// Separator between category labels in a compound type.
pub const TYPE_SEPARATOR: &str = " + ";
/// Separator between explanations of a compound anomaly.
pub const EXPLANATION_SEPARATOR: &str = " | ";

/// Category of a cost anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Residual above the upper fence.
    Spike,
    /// Residual below the lower fence.
    Drop,
    /// Rolling-mean slope above the drift threshold.
    Drift,
}

impl AnomalyKind {
    pub fn label(self) -> &'static str {
        match self {
            AnomalyKind::Spike => "spike",
            AnomalyKind::Drop => "drop",
            AnomalyKind::Drift => "drift",
        }
    }

    /// Human-readable rationale attached to flagged rows.
    pub fn explanation(self) -> &'static str {
        match self {
            AnomalyKind::Spike => {
                "Cost significantly exceeded historical trend. Likely driven by a usage spike, \
                 auto-scaling burst, or short-lived workload expansion."
            }
            AnomalyKind::Drop => {
                "Cost dropped well below expected trend. Possibly due to workload \
                 decommissioning, resource optimization, or reduced demand."
            }
            AnomalyKind::Drift => {
                "Gradual sustained increase in cost indicating potential configuration drift, \
                 usage growth, or scaling changes."
            }
        }
    }

    /// Spike and drop are level categories; drift is orthogonal to them.
    pub fn is_level(self) -> bool {
        !matches!(self, AnomalyKind::Drift)
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered set of categories that fired for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AnomalyTags {
    level: Option<AnomalyKind>,
    drift: bool,
}

impl AnomalyTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category.
    ///
    /// Returns `false` (and leaves the tags unchanged) when a different level
    /// category is already present, since spike and drop are exclusive.
    pub fn insert(&mut self, kind: AnomalyKind) -> bool {
        if kind.is_level() {
            match self.level {
                Some(existing) if existing != kind => return false,
                _ => self.level = Some(kind),
            }
        } else {
            self.drift = true;
        }
        true
    }

    pub fn contains(&self, kind: AnomalyKind) -> bool {
        if kind.is_level() {
            self.level == Some(kind)
        } else {
            self.drift
        }
    }

    pub fn level(&self) -> Option<AnomalyKind> {
        self.level
    }

    pub fn has_drift(&self) -> bool {
        self.drift
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none() && !self.drift
    }

    /// Categories in rendering order: level first, then drift.
    pub fn kinds(&self) -> impl Iterator<Item = AnomalyKind> {
        self.level
            .into_iter()
            .chain(self.drift.then_some(AnomalyKind::Drift))
    }

    /// Compound label such as `"spike + drift"`, or `None` when empty.
    pub fn render(&self) -> Option<String> {
        self.join(TYPE_SEPARATOR, AnomalyKind::label)
    }

    /// Explanations of every category joined with `" | "`.
    pub fn explanation(&self) -> Option<String> {
        self.join(EXPLANATION_SEPARATOR, AnomalyKind::explanation)
    }

    fn join(&self, separator: &str, part: fn(AnomalyKind) -> &'static str) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.kinds().map(part).collect::<Vec<_>>().join(separator))
    }
}

/// A cost observation together with its anomaly annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedObservation {
    pub observation: CostObservation,
    pub tags: AnomalyTags,
}

impl AnnotatedObservation {
    /// Wrap an observation with no anomaly.
    pub fn unflagged(observation: CostObservation) -> Self {
        Self {
            observation,
            tags: AnomalyTags::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.observation.date
    }

    pub fn cost(&self) -> f64 {
        self.observation.cost
    }

    pub fn anomaly_any(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn anomaly_type(&self) -> Option<String> {
        self.tags.render()
    }

    pub fn explanation(&self) -> Option<String> {
        self.tags.explanation()
    }

    /// Flatten into the column layout consumed by tables and exports.
    pub fn to_record(&self) -> AnnotatedRecord {
        AnnotatedRecord {
            date: self.observation.date,
            service: self.observation.service.clone(),
            cost: self.observation.cost,
            usage: self.observation.usage,
            anomaly_any: self.anomaly_any(),
            anomaly_type: self.anomaly_type(),
            explanation: self.explanation(),
        }
    }
}

/// Flat, serializable form of an [`AnnotatedObservation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub date: NaiveDate,
    pub service: String,
    pub cost: f64,
    pub usage: f64,
    pub anomaly_any: bool,
    pub anomaly_type: Option<String>,
    pub explanation: Option<String>,
}
