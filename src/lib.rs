//! tsquery - Compile time-bucketed metric queries to PostgreSQL
//!
//! This library provides:
//! - Metric catalog types and a YAML-backed catalog
//! - Validated, immutable timeseries query descriptions
//! - Metric selection (select, then exclude)
//! - Stage planning (Init, Aggregate, Densify, Cumulative)
//! - PostgreSQL emission with every identifier and literal quoted
//! - Streaming execution through a server-side cursor
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `catalog/` - metric definitions per organization (MetricDefinition, Catalog)
//! - `query/` - query request types (QueryRequest, QuerySpec, SeriesSource)
//! - `plan/` - logical plan types (PlanNode, Expr, Column)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → Catalog
//! - `selector/` - catalog metrics + QuerySpec → SelectedMetrics
//! - `planner/` - QuerySpec + SelectedMetrics → PlanNode
//! - `emitter/` - PlanNode → SQL
//! - `executor/` - SQL → RowStream
//!
//! # Example
//!
//! ```ignore
//! use tsquery::{compile_query, parser, Executor, QuerySpec, SeriesSource, Settings, Unit};
//!
//! let settings = Settings::load("tsquery.toml")?;
//! let catalog = parser::parse_file("metrics.yaml")?;
//! let spec = QuerySpec::builder([17, 42]).unit(Unit::Day).sparse(false).build()?;
//! let compiled = compile_query(&catalog, &SeriesSource::CONTENT, 1, &spec)?;
//!
//! let executor = Executor::connect(&settings).await?;
//! let mut rows = executor.execute(&compiled).await?;
//! while let Some(row) = rows.next().await? {
//!     println!("{} {:?} {:?}", row.bucket, row.entity_id, row.values);
//! }
//! ```

pub mod catalog;
pub mod query;
pub mod selector;
pub mod plan;
pub mod planner;
pub mod emitter;
pub mod parser;
pub mod compile;
pub mod executor;
pub mod config;
pub mod telemetry;
pub mod error;

// Re-export commonly used types
pub use catalog::{Aggregation, Catalog, CatalogError, MetricCatalog, MetricDefinition, MetricKind, MetricMap, MetricScope, OrgId};
pub use query::{ConfigError, EntityId, QueryRequest, QuerySpec, QuerySpecBuilder, Selection, SeriesSource, Transform, Unit};
pub use selector::{select_metrics, SelectedMetrics};
pub use plan::{PlanNode, Expr, Column, AggregateExpr};
pub use planner::{plan_query, OutputColumns, PlanError, QueryPlan, StageKind};
pub use emitter::{emit_sql, EmitError};
pub use compile::{compile_query, CompiledQuery};
pub use executor::{Cursor, ExecuteError, Executor, PgCursor, Row, RowStream};
pub use config::{Settings, SettingsError};
pub use error::{Error, ParseError};
