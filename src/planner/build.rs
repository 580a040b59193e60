//! Stage selection
//!
//! Chooses which stages a query needs and nests them bottom-up:
//!
//! | sparse | hourly & grouped | transform  | chain                         |
//! |--------|------------------|------------|-------------------------------|
//! | yes    | yes              | none       | Init                          |
//! | yes    | no               | none       | Init → Aggregate              |
//! | no     | yes              | none       | Init → Densify                |
//! | no     | no               | none       | Init → Aggregate → Densify    |
//! | any    | any              | cumulative | (chain above) → Cumulative    |
//!
//! The chain is wrapped in a final sort by bucket, then entity.

use std::fmt;

use super::error::PlanError;
use super::stages::{aggregate_stage, cumulative_stage, densify_stage, init_stage, StageContext};
use crate::plan::{PlanNode, Sort};
use crate::query::{QuerySpec, SeriesSource, Transform};
use crate::selector::SelectedMetrics;

/// One stage of a compiled query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Init,
    Aggregate,
    Densify,
    Cumulative,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Init => "init",
            StageKind::Aggregate => "aggregate",
            StageKind::Densify => "densify",
            StageKind::Cumulative => "cumulative",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the columns every output row carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumns {
    /// Bucket start timestamp
    pub bucket: String,
    /// Entity id, present only when grouping by id
    pub entity: Option<String>,
    /// Metric values in output order
    pub metrics: Vec<String>,
}

/// A planned query: the plan tree plus what it produces
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub root: PlanNode,
    /// Stages innermost first
    pub stages: Vec<StageKind>,
    pub columns: OutputColumns,
}

/// Build the plan for one query over `source`
pub fn plan_query(
    source: &SeriesSource,
    spec: &QuerySpec,
    metrics: &SelectedMetrics,
) -> Result<QueryPlan, PlanError> {
    if metrics.is_empty() {
        return Err(PlanError::NoMetrics);
    }
    let columns = output_columns(source, spec, metrics)?;

    let ctx = StageContext::new(source, spec, metrics);
    let mut stages = vec![StageKind::Init];
    let mut plan = init_stage(&ctx);

    if !spec.native_granularity() {
        plan = aggregate_stage(&ctx, plan);
        stages.push(StageKind::Aggregate);
    }
    if !spec.sparse() {
        plan = densify_stage(&ctx, plan);
        stages.push(StageKind::Densify);
    }
    match spec.transform() {
        Transform::None => {}
        Transform::Cumulative => {
            plan = cumulative_stage(&ctx, plan);
            stages.push(StageKind::Cumulative);
        }
    }

    let root = PlanNode::Sort(Sort {
        input: Box::new(plan),
        sort_keys: ctx.ordering(),
    });

    Ok(QueryPlan { root, stages, columns })
}

fn output_columns(
    source: &SeriesSource,
    spec: &QuerySpec,
    metrics: &SelectedMetrics,
) -> Result<OutputColumns, PlanError> {
    let bucket = source.date_column().to_string();
    let entity = spec.group_by_id().then(|| source.id_column().to_string());

    // The entity column is read by Init even when it is not output
    let reserved = [source.date_column(), source.id_column()];
    if let Some(clash) = metrics.iter().find(|m| reserved.contains(&m.name.as_str())) {
        return Err(PlanError::ColumnConflict(clash.name.clone()));
    }

    Ok(OutputColumns {
        bucket,
        entity,
        metrics: metrics.names(),
    })
}
