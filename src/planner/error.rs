//! Planner errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Selection and exclusion left nothing to query
    #[error("query selects no metrics")]
    NoMetrics,
    /// A metric name collides with the bucket or entity column
    #[error("metric '{0}' has the same name as an output column")]
    ColumnConflict(String),
}
