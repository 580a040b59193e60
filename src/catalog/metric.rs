//! Metric definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::types::{Aggregation, MetricKind};

/// Metric definitions keyed by metric name
pub type MetricMap = BTreeMap<String, MetricDefinition>;

/// A stored or computed timeseries metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    /// Storage kind: per-period count or running total
    #[serde(default, alias = "type")]
    pub kind: MetricKind,
    /// How observations within one bucket are combined
    #[serde(default, alias = "agg")]
    pub aggregation: Aggregation,
    /// Derived from other metrics upstream; read like any stored metric
    #[serde(default)]
    pub computed: bool,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, kind: MetricKind, aggregation: Aggregation) -> Self {
        Self {
            name: name.into(),
            kind,
            aggregation,
            computed: false,
        }
    }
}
