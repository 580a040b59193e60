//! Result rows

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::Row as _;

use super::error::ExecuteError;
use crate::planner::OutputColumns;
use crate::query::EntityId;

/// One bucket of one series
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Start of the bucket
    pub bucket: DateTime<Utc>,
    /// Entity the values belong to; `None` when ids are merged
    pub entity_id: Option<EntityId>,
    /// Metric values by name; `None` is SQL NULL
    pub values: BTreeMap<String, Option<Decimal>>,
}

impl Row {
    /// Value of one metric, flattening "missing" and NULL
    pub fn get(&self, metric: &str) -> Option<Decimal> {
        self.values.get(metric).copied().flatten()
    }

    /// Decode a database row laid out as `columns`
    pub fn from_pg(row: &PgRow, columns: &OutputColumns) -> Result<Self, ExecuteError> {
        let bucket = decode_bucket(row, &columns.bucket)?;
        let entity_id = match &columns.entity {
            Some(name) => Some(decode_entity(row, name)?),
            None => None,
        };

        let values = columns.metrics
            .iter()
            .map(|name| {
                let value = row
                    .try_get::<Option<Decimal>, _>(name.as_str())
                    .map_err(|source| decode_error(name, source))?;
                Ok((name.clone(), value))
            })
            .collect::<Result<_, ExecuteError>>()?;

        Ok(Row { bucket, entity_id, values })
    }
}

/// `timestamptz`, or `timestamp` read as UTC
fn decode_bucket(row: &PgRow, name: &str) -> Result<DateTime<Utc>, ExecuteError> {
    match row.try_get::<DateTime<Utc>, _>(name) {
        Ok(ts) => Ok(ts),
        Err(sqlx::Error::ColumnDecode { .. }) => row
            .try_get::<NaiveDateTime, _>(name)
            .map(|naive| naive.and_utc())
            .map_err(|source| decode_error(name, source)),
        Err(source) => Err(decode_error(name, source)),
    }
}

/// `bigint`, or `integer` widened
fn decode_entity(row: &PgRow, name: &str) -> Result<EntityId, ExecuteError> {
    match row.try_get::<i64, _>(name) {
        Ok(id) => Ok(id),
        Err(sqlx::Error::ColumnDecode { .. }) => row
            .try_get::<i32, _>(name)
            .map(EntityId::from)
            .map_err(|source| decode_error(name, source)),
        Err(source) => Err(decode_error(name, source)),
    }
}

fn decode_error(column: &str, source: sqlx::Error) -> ExecuteError {
    ExecuteError::Decode {
        column: column.to_string(),
        source,
    }
}
