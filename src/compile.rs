//! Compile pipeline
//!
//! catalog + series source + org + QuerySpec → one PostgreSQL statement.

use crate::catalog::{MetricCatalog, OrgId};
use crate::emitter::emit_sql;
use crate::error::Error;
use crate::planner::{plan_query, OutputColumns, StageKind};
use crate::query::{QuerySpec, SeriesSource};
use crate::selector::select_metrics;

/// A query ready to execute
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// The full statement, with every value inlined as a quoted literal
    pub sql: String,
    /// Columns each result row carries
    pub columns: OutputColumns,
    /// Stages innermost first
    pub stages: Vec<StageKind>,
}

impl CompiledQuery {
    /// Stage chain for logging, e.g. `init > aggregate`
    pub fn stage_chain(&self) -> String {
        self.stages
            .iter()
            .map(StageKind::as_str)
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

/// Compile a query for `org` over the series table described by `source`
pub fn compile_query<C>(
    catalog: &C,
    source: &SeriesSource,
    org: OrgId,
    spec: &QuerySpec,
) -> Result<CompiledQuery, Error>
where
    C: MetricCatalog + ?Sized,
{
    let base = catalog.metrics_for(org, source.scope())?;
    let computed = catalog.computed_metrics_for(org, source.scope())?;
    let metrics = select_metrics(base, computed, spec.select(), spec.exclude());

    let plan = plan_query(source, spec, &metrics)?;
    let sql = emit_sql(&plan.root)?;

    let compiled = CompiledQuery {
        sql,
        columns: plan.columns,
        stages: plan.stages,
    };
    tracing::debug!(
        org,
        table = source.table(),
        stages = %compiled.stage_chain(),
        metrics = compiled.columns.metrics.len(),
        "compiled timeseries query"
    );
    Ok(compiled)
}
