//! Execution errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Connection, syntax, timeout or any other engine failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A result column did not have the expected type
    #[error("failed to decode column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: sqlx::Error,
    },
    /// `next()` was called after `close()`
    #[error("row stream used after close")]
    StreamClosed,
}
