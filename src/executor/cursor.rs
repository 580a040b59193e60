//! Server-side cursors

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::Transaction;

use super::error::ExecuteError;
use super::row::Row;
use crate::compile::CompiledQuery;
use crate::planner::OutputColumns;

/// Name of the cursor declared inside each transaction
const CURSOR_NAME: &str = "tsquery_rows";

/// A forward-only source of result rows
#[async_trait]
pub trait Cursor: Send {
    /// Up to `max_rows` further rows; fewer means the result is exhausted
    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Row>, ExecuteError>;

    /// Release the cursor and whatever holds it open
    async fn close(&mut self) -> Result<(), ExecuteError>;
}

/// A `NO SCROLL` cursor inside a read-only transaction.
///
/// Dropping it without `close()` drops the transaction, which rolls back
/// and discards the cursor.
pub struct PgCursor {
    tx: Option<Transaction<'static, Postgres>>,
    columns: OutputColumns,
}

impl PgCursor {
    pub async fn open(
        pool: &PgPool,
        query: &CompiledQuery,
        statement_timeout: Option<Duration>,
    ) -> Result<Self, ExecuteError> {
        let mut tx = pool.begin().await?;

        sqlx::raw_sql("SET TRANSACTION READ ONLY").execute(&mut *tx).await?;
        if let Some(timeout) = statement_timeout {
            let set_timeout = format!("SET LOCAL statement_timeout = {}", timeout.as_millis());
            sqlx::raw_sql(&set_timeout).execute(&mut *tx).await?;
        }

        let declare = format!("DECLARE {CURSOR_NAME} NO SCROLL CURSOR FOR\n{}", query.sql);
        sqlx::raw_sql(&declare).execute(&mut *tx).await?;

        Ok(Self {
            tx: Some(tx),
            columns: query.columns.clone(),
        })
    }
}

#[async_trait]
impl Cursor for PgCursor {
    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Row>, ExecuteError> {
        let tx = self.tx.as_mut().ok_or(ExecuteError::StreamClosed)?;

        let fetch = format!("FETCH FORWARD {max_rows} FROM {CURSOR_NAME}");
        let rows = sqlx::query(&fetch)
            .persistent(false)
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| Row::from_pg(row, &self.columns))
            .collect()
    }

    async fn close(&mut self) -> Result<(), ExecuteError> {
        let Some(mut tx) = self.tx.take() else {
            return Ok(());
        };
        let close = format!("CLOSE {CURSOR_NAME}");
        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&close)).await?;
        tx.commit().await?;
        Ok(())
    }
}
