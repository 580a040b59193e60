//! Query configuration errors
//!
//! Every variant is raised while a `QuerySpec` or `SeriesSource` is built,
//! before anything is compiled or sent to the database.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Query must name at least one entity id")]
    EmptyEntityIds,
    #[error("Unknown unit '{0}'. Valid options: hour, day, week, month, quarter, year")]
    UnknownUnit(String),
    #[error("Unit '{0}' is finer than the stored granularity (hour)")]
    UnitBelowMinimum(String),
    #[error("Transform '{0}' is not supported yet")]
    UnsupportedTransform(String),
    #[error("Unknown transform '{0}'. Valid options: none, cumulative")]
    UnknownTransform(String),
    #[error("Invalid date '{0}', expected RFC 3339, 'YYYY-MM-DDTHH:MM:SS' or 'YYYY-MM-DD'")]
    InvalidDate(String),
    #[error("Date window is inverted: after {after} is later than before {before}")]
    InvertedWindow {
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    },
    #[error("Invalid SQL identifier '{0}'")]
    InvalidIdentifier(String),
}
