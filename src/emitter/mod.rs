//! SQL emitter (verb module)
//!
//! Renders a PlanNode as PostgreSQL text.

mod error;
mod sql;

pub use error::EmitError;
pub use sql::{emit_sql, quote_ident, quote_literal};
