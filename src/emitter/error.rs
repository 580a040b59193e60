//! Emitter errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(String),
    /// Identifier that cannot be quoted
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    /// Invalid plan structure
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}
