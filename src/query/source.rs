//! Timeseries table descriptors

use std::borrow::Cow;

use super::error::ConfigError;
use crate::catalog::MetricScope;

/// PostgreSQL truncates identifiers longer than this
const MAX_IDENTIFIER_LEN: usize = 63;

/// Where a family of timeseries lives and how to read it.
///
/// One descriptor per stored series table; the compiler is otherwise
/// identical for every table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSource {
    table: Cow<'static, str>,
    id_column: Cow<'static, str>,
    date_column: Cow<'static, str>,
    metrics_column: Cow<'static, str>,
    calendar_function: Cow<'static, str>,
    scope: MetricScope,
}

impl SeriesSource {
    /// Per-content-item metrics
    pub const CONTENT: SeriesSource = SeriesSource {
        table: Cow::Borrowed("content_metric_timeseries"),
        id_column: Cow::Borrowed("content_item_id"),
        date_column: Cow::Borrowed("datetime"),
        metrics_column: Cow::Borrowed("metrics"),
        calendar_function: Cow::Borrowed("content_metric_calendar"),
        scope: MetricScope::Content,
    };

    /// Per-organization metrics
    pub const ORG: SeriesSource = SeriesSource {
        table: Cow::Borrowed("org_metric_timeseries"),
        id_column: Cow::Borrowed("org_id"),
        date_column: Cow::Borrowed("datetime"),
        metrics_column: Cow::Borrowed("metrics"),
        calendar_function: Cow::Borrowed("org_metric_calendar"),
        scope: MetricScope::Org,
    };

    /// Describe another series table with the standard `datetime` and
    /// `metrics` columns. Every name must be a plain SQL identifier.
    pub fn new(
        table: impl Into<String>,
        id_column: impl Into<String>,
        calendar_function: impl Into<String>,
        scope: MetricScope,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table: Cow::Owned(identifier(table.into())?),
            id_column: Cow::Owned(identifier(id_column.into())?),
            calendar_function: Cow::Owned(identifier(calendar_function.into())?),
            scope,
            ..Self::CONTENT
        })
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Result<Self, ConfigError> {
        self.date_column = Cow::Owned(identifier(column.into())?);
        Ok(self)
    }

    pub fn with_metrics_column(mut self, column: impl Into<String>) -> Result<Self, ConfigError> {
        self.metrics_column = Cow::Owned(identifier(column.into())?);
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn metrics_column(&self) -> &str {
        &self.metrics_column
    }

    pub fn calendar_function(&self) -> &str {
        &self.calendar_function
    }

    /// Which catalog scope holds this table's metric definitions
    pub fn scope(&self) -> MetricScope {
        self.scope
    }
}

/// Accept `[A-Za-z_][A-Za-z0-9_]*` up to the PostgreSQL identifier length
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn identifier(name: String) -> Result<String, ConfigError> {
    if is_identifier(&name) {
        Ok(name)
    } else {
        Err(ConfigError::InvalidIdentifier(name))
    }
}
