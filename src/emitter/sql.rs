//! SQL emitter
//!
//! Transforms a PlanNode tree into a PostgreSQL query string.
//!
//! Every identifier is double-quoted and every string literal is escaped
//! here, so nothing upstream ever splices raw text into the query.

use chrono::SecondsFormat;

use super::error::EmitError;
use crate::catalog::Aggregation;
use crate::plan::{
    Aggregate, AggregateExpr, Calendar, Column, Expr, Filter, Join, Literal, PlanNode, Project,
    ProjectExpr, Scan, Sort, SortKey, WindowFunction,
};

/// Emit a pretty-printed SQL string from a PlanNode.
pub fn emit_sql(node: &PlanNode) -> Result<String, EmitError> {
    emit_node(node, 0)
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

// ---------------------------------------------------------------------------
// Node dispatch
// ---------------------------------------------------------------------------

fn emit_node(node: &PlanNode, indent: usize) -> Result<String, EmitError> {
    match node {
        PlanNode::Scan(_) | PlanNode::Calendar(_) => {
            let p = pad(indent);
            Ok(format!("{p}SELECT *\n{p}FROM {}", emit_leaf(node)?))
        }
        PlanNode::Filter(filter) => emit_filter(filter, indent),
        PlanNode::Project(proj) => emit_project(proj, indent),
        PlanNode::Aggregate(agg) => emit_aggregate(agg, indent),
        PlanNode::Join(join) => emit_join(join, indent),
        PlanNode::Sort(sort) => emit_sort(sort, indent),
    }
}

/// FROM clause for a node's input.
///
/// Leaves and filtered leaves are read directly; anything else becomes an
/// aliased subquery.
fn emit_from(input: &PlanNode, alias: &str, indent: usize) -> Result<String, EmitError> {
    let p = pad(indent);
    match input {
        PlanNode::Scan(_) | PlanNode::Calendar(_) => Ok(format!("{p}FROM {}", emit_leaf(input)?)),
        PlanNode::Filter(filter) if filter.input.is_leaf() => Ok(format!(
            "{p}FROM {}\n{p}WHERE {}",
            emit_leaf(&filter.input)?,
            emit_expr(&filter.predicate)?,
        )),
        _ => {
            let inner = emit_node(input, indent + 1)?;
            Ok(format!("{p}FROM (\n{inner}\n{p}) AS {}", quote_ident(alias)?))
        }
    }
}

// ---------------------------------------------------------------------------
// Relation nodes
// ---------------------------------------------------------------------------

fn emit_leaf(node: &PlanNode) -> Result<String, EmitError> {
    match node {
        PlanNode::Scan(scan) => emit_scan(scan),
        PlanNode::Calendar(cal) => emit_calendar(cal),
        _ => Err(EmitError::InvalidPlan(
            "expected a table scan or calendar function".to_string(),
        )),
    }
}

fn emit_scan(scan: &Scan) -> Result<String, EmitError> {
    quote_ident(&scan.table)
}

fn emit_calendar(cal: &Calendar) -> Result<String, EmitError> {
    let args: Vec<String> = cal.args.iter().map(emit_expr).collect::<Result<_, _>>()?;
    Ok(format!("{}({})", quote_ident(&cal.function)?, args.join(", ")))
}

fn emit_filter(filter: &Filter, indent: usize) -> Result<String, EmitError> {
    let p = pad(indent);
    let from = emit_from(&filter.input, "_f", indent)?;
    let predicate = emit_expr(&filter.predicate)?;
    Ok(format!("{p}SELECT *\n{from}\n{p}WHERE {predicate}"))
}

fn emit_project(proj: &Project, indent: usize) -> Result<String, EmitError> {
    if proj.expressions.is_empty() {
        return Err(EmitError::InvalidPlan("Project requires at least one expression".to_string()));
    }
    let p = pad(indent);
    let items = emit_project_items(&proj.expressions)?;
    let from = emit_from(&proj.input, "_p", indent)?;
    let distinct = if proj.distinct { "DISTINCT " } else { "" };
    Ok(format!("{p}SELECT {distinct}{items}\n{from}"))
}

fn emit_aggregate(agg: &Aggregate, indent: usize) -> Result<String, EmitError> {
    let p = pad(indent);
    let from = emit_from(&agg.input, "_a", indent)?;

    let group_exprs: Vec<String> = agg.group_by
        .iter()
        .map(|g| emit_expr(&g.expr))
        .collect::<Result<_, _>>()?;

    let mut select_items: Vec<String> = agg.group_by
        .iter()
        .map(emit_project_item)
        .collect::<Result<_, _>>()?;
    for a in &agg.aggregates {
        select_items.push(emit_aggregate_expr(a)?);
    }
    if select_items.is_empty() {
        return Err(EmitError::InvalidPlan("Aggregate has no output columns".to_string()));
    }

    if group_exprs.is_empty() {
        Ok(format!("{p}SELECT {}\n{from}", select_items.join(", ")))
    } else {
        Ok(format!(
            "{p}SELECT {}\n{from}\n{p}GROUP BY {}",
            select_items.join(", "),
            group_exprs.join(", "),
        ))
    }
}

fn emit_join(join: &Join, indent: usize) -> Result<String, EmitError> {
    if join.on.is_empty() {
        return Err(EmitError::InvalidPlan("Join requires at least one key".to_string()));
    }
    let p = pad(indent);
    let items = emit_project_items(&join.expressions)?;
    let left = emit_join_side(&join.left, &join.left_alias, indent)?;
    let right = emit_join_side(&join.right, &join.right_alias, indent)?;

    let keys: Vec<String> = join.on
        .iter()
        .map(|(l, r)| Ok(format!("{} = {}", emit_column(l)?, emit_column(r)?)))
        .collect::<Result<_, EmitError>>()?;

    Ok(format!(
        "{p}SELECT {items}\n{p}FROM {left}\n{p}LEFT JOIN {right}\n{p}  ON {}",
        keys.join(" AND "),
    ))
}

fn emit_join_side(node: &PlanNode, alias: &str, indent: usize) -> Result<String, EmitError> {
    let alias = quote_ident(alias)?;
    if node.is_leaf() {
        return Ok(format!("{} AS {alias}", emit_leaf(node)?));
    }
    let p = pad(indent);
    let inner = emit_node(node, indent + 1)?;
    Ok(format!("(\n{inner}\n{p}) AS {alias}"))
}

fn emit_sort(sort: &Sort, indent: usize) -> Result<String, EmitError> {
    let p = pad(indent);
    let keys: Vec<String> = sort.sort_keys
        .iter()
        .map(emit_sort_key)
        .collect::<Result<_, _>>()?;

    // ORDER BY can be appended to any SELECT that names its own outputs
    match sort.input.as_ref() {
        PlanNode::Project(_) | PlanNode::Aggregate(_) | PlanNode::Join(_) | PlanNode::Filter(_) => {
            let input = emit_node(&sort.input, indent)?;
            Ok(format!("{input}\n{p}ORDER BY {}", keys.join(", ")))
        }
        _ => {
            let from = emit_from(&sort.input, "_s", indent)?;
            Ok(format!("{p}SELECT *\n{from}\n{p}ORDER BY {}", keys.join(", ")))
        }
    }
}

fn emit_sort_key(key: &SortKey) -> Result<String, EmitError> {
    Ok(format!("{} ASC", emit_column(&key.column)?))
}

fn emit_project_items(items: &[ProjectExpr]) -> Result<String, EmitError> {
    let items: Vec<String> = items.iter().map(emit_project_item).collect::<Result<_, _>>()?;
    Ok(items.join(", "))
}

fn emit_project_item(pe: &ProjectExpr) -> Result<String, EmitError> {
    let expr_sql = emit_expr(&pe.expr)?;
    match &pe.expr {
        Expr::Column(col) if col.name == pe.alias => Ok(expr_sql),
        _ => Ok(format!("{} AS {}", expr_sql, quote_ident(&pe.alias)?)),
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn emit_expr(expr: &Expr) -> Result<String, EmitError> {
    match expr {
        Expr::Column(col) => emit_column(col),
        Expr::Literal(lit) => emit_literal(lit),
        Expr::BinaryOp { left, op, right } => {
            let l = emit_expr(left)?;
            let r = emit_expr(right)?;
            Ok(format!("{} {} {}", l, op.as_str(), r))
        }
        Expr::And(exprs) => {
            if exprs.is_empty() {
                return Err(EmitError::InvalidPlan("AND requires at least one operand".to_string()));
            }
            let parts: Vec<String> = exprs.iter().map(emit_expr).collect::<Result<_, _>>()?;
            Ok(format!("({})", parts.join(" AND ")))
        }
        Expr::In { expr, values } => {
            if values.is_empty() {
                return Err(EmitError::InvalidPlan("IN requires at least one value".to_string()));
            }
            let needle = emit_expr(expr)?;
            let vals: Vec<String> = values.iter().map(emit_expr).collect::<Result<_, _>>()?;
            Ok(format!("{} IN ({})", needle, vals.join(", ")))
        }
        Expr::Subtract(a, b) => Ok(format!("({} - {})", emit_expr(a)?, emit_expr(b)?)),
        Expr::Coalesce(exprs) => {
            let parts: Vec<String> = exprs.iter().map(emit_expr).collect::<Result<_, _>>()?;
            Ok(format!("COALESCE({})", parts.join(", ")))
        }
        Expr::JsonNumber { document, key } => Ok(format!(
            "({} ->> {})::numeric",
            emit_column(document)?,
            quote_literal(key),
        )),
        Expr::DateTrunc { unit, expr } => Ok(format!(
            "date_trunc({}, {})",
            quote_literal(unit.as_str()),
            emit_expr(expr)?,
        )),
        Expr::Window { func, partition_by, order_by } => {
            let call = match func {
                WindowFunction::Lag(inner) => format!("LAG({})", emit_expr(inner)?),
                WindowFunction::Sum(inner) => format!("SUM({})", emit_expr(inner)?),
            };
            let mut clauses = Vec::new();
            if !partition_by.is_empty() {
                let cols: Vec<String> = partition_by.iter().map(emit_column).collect::<Result<_, _>>()?;
                clauses.push(format!("PARTITION BY {}", cols.join(", ")));
            }
            if !order_by.is_empty() {
                let keys: Vec<String> = order_by.iter().map(emit_sort_key).collect::<Result<_, _>>()?;
                clauses.push(format!("ORDER BY {}", keys.join(", ")));
            }
            Ok(format!("{} OVER ({})", call, clauses.join(" ")))
        }
    }
}

fn emit_column(col: &Column) -> Result<String, EmitError> {
    if col.table.is_empty() {
        quote_ident(&col.name)
    } else {
        Ok(format!("{}.{}", quote_ident(&col.table)?, quote_ident(&col.name)?))
    }
}

fn emit_literal(lit: &Literal) -> Result<String, EmitError> {
    Ok(match lit {
        Literal::NullTimestamp => "CAST(NULL AS TIMESTAMPTZ)".to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::String(s) => quote_literal(s),
        Literal::Timestamp(ts) => format!(
            "{}::timestamptz",
            quote_literal(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        ),
        Literal::IntArray(values) => {
            let items: Vec<String> = values.iter().map(i64::to_string).collect();
            format!("ARRAY[{}]::bigint[]", items.join(", "))
        }
    })
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> Result<String, EmitError> {
    if name.is_empty() || name.contains('\0') {
        return Err(EmitError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Single-quote a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

fn emit_aggregate_expr(agg: &AggregateExpr) -> Result<String, EmitError> {
    let inner = emit_expr(&agg.expr)?;
    let func_sql = match agg.func {
        Aggregation::Sum => format!("SUM({})", inner),
        Aggregation::Avg => format!("AVG({})", inner),
        Aggregation::Max => format!("MAX({})", inner),
        Aggregation::Min => format!("MIN({})", inner),
        Aggregation::Last => {
            let order = agg.order_by.as_ref().ok_or_else(|| {
                EmitError::MissingField(format!("ordering column for last({})", agg.alias))
            })?;
            format!("(ARRAY_AGG({} ORDER BY {} DESC))[1]", inner, emit_column(order)?)
        }
    };
    let value = match agg.precision {
        Some(digits) => format!("ROUND({}, {})", func_sql, digits),
        None => func_sql,
    };
    Ok(format!("{} AS {}", value, quote_ident(&agg.alias)?))
}
