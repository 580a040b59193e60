//! Stage compilers
//!
//! Each stage is a pure function from the query context (and, except for
//! Init, the relation it wraps) to a plan node. Every stage outputs the same
//! columns: the bucket, the entity id when grouping by id, then one column
//! per selected metric.

use crate::catalog::{Aggregation, MetricDefinition, MetricKind};
use crate::plan::{
    Aggregate, AggregateExpr, BinaryOperator, Calendar, Column, Expr, Filter, Join, Literal,
    PlanNode, Project, ProjectExpr, Scan, SortKey, WindowFunction,
};
use crate::query::{QuerySpec, SeriesSource, Unit};
use crate::selector::SelectedMetrics;

/// Relation aliases used by the Densify join
const CALENDAR_ALIAS: &str = "cal";
const SPARSE_ALIAS: &str = "sparse";

/// Everything a stage compiler reads
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub source: &'a SeriesSource,
    pub spec: &'a QuerySpec,
    pub metrics: &'a SelectedMetrics,
}

impl<'a> StageContext<'a> {
    pub fn new(source: &'a SeriesSource, spec: &'a QuerySpec, metrics: &'a SelectedMetrics) -> Self {
        Self { source, spec, metrics }
    }

    fn bucket(&self) -> Column {
        Column::unqualified(self.source.date_column())
    }

    fn entity(&self) -> Column {
        Column::unqualified(self.source.id_column())
    }

    /// The entity column, if it is part of the output
    fn output_entity(&self) -> Option<Column> {
        self.spec.group_by_id().then(|| self.entity())
    }

    /// Bucket then entity, both ascending
    pub fn ordering(&self) -> Vec<SortKey> {
        let mut keys = vec![SortKey::asc(self.bucket())];
        keys.extend(self.output_entity().map(SortKey::asc));
        keys
    }

    /// Bucket and entity passed through unchanged
    fn key_columns(&self) -> Vec<ProjectExpr> {
        let mut keys = vec![ProjectExpr::column(self.bucket())];
        keys.extend(self.output_entity().map(ProjectExpr::column));
        keys
    }
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Read raw rows at hourly granularity.
///
/// Cumulative metrics become per-period deltas via `LAG` over each entity's
/// history; the first observation of an entity has no predecessor and is
/// taken as the delta itself.
pub fn init_stage(ctx: &StageContext<'_>) -> PlanNode {
    let bucket = ctx.bucket();

    let mut expressions = vec![ProjectExpr::new(
        Expr::DateTrunc {
            unit: Unit::MINIMUM,
            expr: Box::new(Expr::Column(bucket.clone())),
        },
        bucket.name.clone(),
    )];
    expressions.extend(ctx.output_entity().map(ProjectExpr::column));
    expressions.extend(ctx.metrics.iter().map(|m| init_metric(ctx, m)));

    PlanNode::Project(Project {
        input: Box::new(PlanNode::Filter(Filter {
            input: Box::new(PlanNode::Scan(Scan::new(ctx.source.table()))),
            predicate: init_predicate(ctx),
        })),
        expressions,
        distinct: false,
    })
}

fn init_metric(ctx: &StageContext<'_>, metric: &MetricDefinition) -> ProjectExpr {
    let value = Expr::JsonNumber {
        document: Column::unqualified(ctx.source.metrics_column()),
        key: metric.name.clone(),
    };

    let expr = match metric.kind {
        MetricKind::Count => value,
        MetricKind::Cumulative => {
            // Deltas are always per entity, even when the output is merged
            let previous = Expr::Window {
                func: WindowFunction::Lag(Box::new(value.clone())),
                partition_by: vec![ctx.entity()],
                order_by: vec![SortKey::asc(ctx.bucket())],
            };
            Expr::Coalesce(vec![
                Expr::Subtract(Box::new(value.clone()), Box::new(previous)),
                value,
            ])
        }
    };

    ProjectExpr::new(expr, metric.name.clone())
}

fn init_predicate(ctx: &StageContext<'_>) -> Expr {
    let bucket = || Expr::Column(ctx.bucket());

    let mut conditions = vec![Expr::In {
        expr: Box::new(Expr::Column(ctx.entity())),
        values: ctx.spec.entity_ids().iter().map(|id| Expr::int(*id)).collect(),
    }];
    if let Some(after) = ctx.spec.after() {
        conditions.push(Expr::compare(
            bucket(),
            BinaryOperator::GtEq,
            Expr::Literal(Literal::Timestamp(after)),
        ));
    }
    if let Some(before) = ctx.spec.before() {
        conditions.push(Expr::compare(
            bucket(),
            BinaryOperator::LtEq,
            Expr::Literal(Literal::Timestamp(before)),
        ));
    }

    if conditions.len() == 1 {
        conditions.remove(0)
    } else {
        Expr::And(conditions)
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Collapse rows into `unit` buckets (and entities, when grouping by id)
pub fn aggregate_stage(ctx: &StageContext<'_>, input: PlanNode) -> PlanNode {
    let bucket = ctx.bucket();

    let mut group_by = vec![ProjectExpr::new(
        Expr::DateTrunc {
            unit: ctx.spec.unit(),
            expr: Box::new(Expr::Column(bucket.clone())),
        },
        bucket.name.clone(),
    )];
    group_by.extend(ctx.output_entity().map(ProjectExpr::column));

    let aggregates = ctx.metrics
        .iter()
        .map(|m| AggregateExpr {
            func: m.aggregation,
            expr: Expr::column(m.name.clone()),
            alias: m.name.clone(),
            order_by: (m.aggregation == Aggregation::Last).then(|| bucket.clone()),
            precision: Some(ctx.spec.sig_digits()),
        })
        .collect();

    PlanNode::Aggregate(Aggregate {
        input: Box::new(input),
        group_by,
        aggregates,
    })
}

// ---------------------------------------------------------------------------
// Densify
// ---------------------------------------------------------------------------

/// Left-join the relation onto every calendar bucket, filling gaps with zero
pub fn densify_stage(ctx: &StageContext<'_>, input: PlanNode) -> PlanNode {
    let bucket = ctx.bucket();
    let calendar = PlanNode::Calendar(calendar_call(ctx));

    // Ungrouped output needs each bucket once, not once per entity
    let left = if ctx.spec.group_by_id() {
        calendar
    } else {
        PlanNode::Project(Project {
            input: Box::new(calendar),
            expressions: vec![ProjectExpr::column(bucket.clone())],
            distinct: true,
        })
    };

    let mut on = vec![(
        Column::new(CALENDAR_ALIAS, bucket.name.clone()),
        Column::new(SPARSE_ALIAS, bucket.name.clone()),
    )];
    let mut expressions = vec![ProjectExpr::column(Column::new(CALENDAR_ALIAS, bucket.name.clone()))];
    if let Some(entity) = ctx.output_entity() {
        on.push((
            Column::new(CALENDAR_ALIAS, entity.name.clone()),
            Column::new(SPARSE_ALIAS, entity.name.clone()),
        ));
        expressions.push(ProjectExpr::column(Column::new(CALENDAR_ALIAS, entity.name)));
    }
    expressions.extend(ctx.metrics.iter().map(|m| {
        ProjectExpr::new(
            Expr::Coalesce(vec![Expr::qualified(SPARSE_ALIAS, m.name.clone()), Expr::int(0)]),
            m.name.clone(),
        )
    }));

    PlanNode::Join(Join {
        left: Box::new(left),
        left_alias: CALENDAR_ALIAS.to_string(),
        right: Box::new(input),
        right_alias: SPARSE_ALIAS.to_string(),
        on,
        expressions,
    })
}

/// `calendar('1 days', ARRAY[ids], after, before)`; a NULL bound means the
/// observed minimum or maximum
fn calendar_call(ctx: &StageContext<'_>) -> Calendar {
    let bound = |ts: Option<_>| match ts {
        Some(ts) => Expr::Literal(Literal::Timestamp(ts)),
        None => Expr::Literal(Literal::NullTimestamp),
    };

    Calendar {
        function: ctx.source.calendar_function().to_string(),
        args: vec![
            Expr::Literal(Literal::String(ctx.spec.unit().step())),
            Expr::Literal(Literal::IntArray(ctx.spec.entity_ids().iter().copied().collect())),
            bound(ctx.spec.after()),
            bound(ctx.spec.before()),
        ],
    }
}

// ---------------------------------------------------------------------------
// Cumulative
// ---------------------------------------------------------------------------

/// Running total of every `sum` metric; other metrics pass through
pub fn cumulative_stage(ctx: &StageContext<'_>, input: PlanNode) -> PlanNode {
    let mut expressions = ctx.key_columns();
    expressions.extend(ctx.metrics.iter().map(|m| {
        if m.aggregation.is_additive() {
            ProjectExpr::new(
                Expr::Window {
                    func: WindowFunction::Sum(Box::new(Expr::column(m.name.clone()))),
                    partition_by: ctx.output_entity().into_iter().collect(),
                    order_by: vec![SortKey::asc(ctx.bucket())],
                },
                m.name.clone(),
            )
        } else {
            ProjectExpr::column(Column::unqualified(m.name.clone()))
        }
    }));

    PlanNode::Project(Project {
        input: Box::new(input),
        expressions,
        distinct: false,
    })
}
