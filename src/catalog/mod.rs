//! Metric catalog types (nouns)
//!
//! Definitions of the metrics each organization tracks, and the read-only
//! lookup contract the compiler uses to fetch them.

mod registry;
mod error;
mod metric;
mod types;

pub use registry::{Catalog, MetricCatalog, MetricScope, OrgId, OrgMetrics};
pub use error::CatalogError;
pub use metric::{MetricDefinition, MetricMap};
pub use types::{Aggregation, MetricKind, ParseAggregationError, ParseMetricKindError};
