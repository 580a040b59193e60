//! Lazy row stream over a cursor

use std::collections::VecDeque;

use futures::stream::{self, Stream};

use super::cursor::Cursor;
use super::error::ExecuteError;
use super::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// More rows may be waiting in the cursor
    Open,
    /// Cursor drained and released; only buffered rows remain
    Exhausted,
    /// Closed by the caller
    Closed,
}

/// Forward-only, single-consumer sequence of result rows.
///
/// Rows are pulled from the cursor in batches as the caller advances. The
/// cursor is released when the last batch arrives, on `close()`, or when the
/// stream is dropped.
pub struct RowStream<C: Cursor> {
    cursor: C,
    buffer: VecDeque<Row>,
    batch_size: usize,
    state: StreamState,
}

impl<C: Cursor> RowStream<C> {
    pub fn new(cursor: C, batch_size: usize) -> Self {
        Self {
            cursor,
            buffer: VecDeque::new(),
            batch_size: batch_size.max(1),
            state: StreamState::Open,
        }
    }

    /// The next row, or `None` once every row has been returned
    pub async fn next(&mut self) -> Result<Option<Row>, ExecuteError> {
        loop {
            if self.state == StreamState::Closed {
                return Err(ExecuteError::StreamClosed);
            }
            if let Some(row) = self.buffer.pop_front() {
                return Ok(Some(row));
            }
            if self.state == StreamState::Exhausted {
                return Ok(None);
            }

            let batch = self.cursor.fetch(self.batch_size).await?;
            tracing::trace!(rows = batch.len(), "fetched batch");
            if batch.len() < self.batch_size {
                self.state = StreamState::Exhausted;
                self.release().await;
            }
            self.buffer.extend(batch);
        }
    }

    /// Stop reading and release the cursor. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.state == StreamState::Open {
            self.release().await;
        }
        self.state = StreamState::Closed;
        self.buffer.clear();
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    /// Adapt into a `futures::Stream` that ends after the last row or the
    /// first error
    pub fn into_stream(self) -> impl Stream<Item = Result<Row, ExecuteError>> {
        stream::unfold(Some(self), |state| async move {
            let mut rows = state?;
            match rows.next().await {
                Ok(Some(row)) => Some((Ok(row), Some(rows))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    async fn release(&mut self) {
        if let Err(e) = self.cursor.close().await {
            tracing::warn!(error = %e, "failed to release cursor");
        }
    }
}
