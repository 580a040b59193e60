//! Query executor (verb module)
//!
//! Runs a CompiledQuery through a PostgreSQL server-side cursor and hands
//! back a lazy RowStream.

mod cursor;
mod error;
mod row;
mod stream;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub use cursor::{Cursor, PgCursor};
pub use error::ExecuteError;
pub use row::Row;
pub use stream::RowStream;

use crate::compile::CompiledQuery;
use crate::config::{ExecutorConfig, Settings};

/// Submits compiled queries to PostgreSQL
#[derive(Debug, Clone)]
pub struct Executor {
    pool: PgPool,
    fetch_size: usize,
    statement_timeout: Option<Duration>,
}

impl Executor {
    pub fn new(pool: PgPool, config: &ExecutorConfig) -> Self {
        Self {
            pool,
            fetch_size: config.fetch_size.max(1),
            statement_timeout: config.statement_timeout(),
        }
    }

    /// Open a connection pool as configured
    pub async fn connect(settings: &Settings) -> Result<Self, ExecuteError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .connect(&settings.database.url)
            .await?;
        Ok(Self::new(pool, &settings.executor))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start executing `query`; rows arrive as the stream is advanced
    pub async fn execute(&self, query: &CompiledQuery) -> Result<RowStream<PgCursor>, ExecuteError> {
        tracing::info!(
            stages = %query.stage_chain(),
            metrics = query.columns.metrics.len(),
            fetch_size = self.fetch_size,
            "executing timeseries query"
        );
        let cursor = PgCursor::open(&self.pool, query, self.statement_timeout).await?;
        Ok(RowStream::new(cursor, self.fetch_size))
    }
}
