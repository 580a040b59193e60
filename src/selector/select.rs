//! Metric selection logic
//!
//! Narrows the catalog's metric maps for one query:
//! - `select` keeps only the named metrics (unknown names are ignored)
//! - `exclude` then removes names regardless of what `select` kept
//!
//! Both phases build new maps from the inputs; nothing is removed from a map
//! while its keys are being walked.

use crate::catalog::{MetricDefinition, MetricMap};
use crate::query::Selection;

/// The metrics one query reads, split the way the catalog splits them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedMetrics {
    /// Stored metrics
    pub base: MetricMap,
    /// Computed metrics, read from the same metrics document
    pub computed: MetricMap,
}

impl SelectedMetrics {
    /// All selected definitions: stored first, then computed, each in name order
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.base.values().chain(self.computed.values())
    }

    /// Selected metric names in output order
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|m| m.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.computed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.computed.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.base.contains_key(name) || self.computed.contains_key(name)
    }
}

/// Apply select-then-exclude to the stored and computed metric maps
pub fn select_metrics(
    base: MetricMap,
    computed: MetricMap,
    select: &Selection,
    exclude: &[String],
) -> SelectedMetrics {
    log_unknown_names(&base, &computed, select, exclude);

    SelectedMetrics {
        base: narrow(base, select, exclude),
        computed: narrow(computed, select, exclude),
    }
}

fn narrow(metrics: MetricMap, select: &Selection, exclude: &[String]) -> MetricMap {
    metrics
        .into_iter()
        .filter(|(name, _)| select.includes(name))
        .filter(|(name, _)| !exclude.iter().any(|e| e == name))
        .collect()
}

fn log_unknown_names(base: &MetricMap, computed: &MetricMap, select: &Selection, exclude: &[String]) {
    let known = |name: &String| base.contains_key(name) || computed.contains_key(name);

    let selected: &[String] = match select {
        Selection::All => &[],
        Selection::Names(names) => names,
    };
    for name in selected.iter().chain(exclude).filter(|n| !known(*n)) {
        tracing::debug!(metric = %name, "ignoring unknown metric name in selection");
    }
}
