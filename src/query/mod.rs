//! Query request types (noun module)
//!
//! `QueryRequest` is raw caller input; `QuerySpec` is its validated,
//! immutable form; `SeriesSource` says which stored table to read.

mod error;
mod request;
mod source;
mod spec;

pub use error::ConfigError;
pub use request::{parse_bound, parse_timestamp, Bound, OneOrMany, QueryRequest};
pub use source::{is_identifier, SeriesSource};
pub use spec::{EntityId, QuerySpec, QuerySpecBuilder, Selection, Transform, Unit};
