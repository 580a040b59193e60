//! Plan node types

use super::expr::{AggregateExpr, Column, Expr};

/// A node in the logical plan tree
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    /// Scan a table
    Scan(Scan),
    /// Rows produced by a set-returning calendar function
    Calendar(Calendar),
    /// Filter rows
    Filter(Filter),
    /// Project columns
    Project(Project),
    /// Aggregate (GROUP BY)
    Aggregate(Aggregate),
    /// Join two relations
    Join(Join),
    /// Sort rows (ORDER BY)
    Sort(Sort),
}

impl PlanNode {
    /// Whether the node reads straight from storage or a function
    pub fn is_leaf(&self) -> bool {
        matches!(self, PlanNode::Scan(_) | PlanNode::Calendar(_))
    }
}

/// Scan a table
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Table name
    pub table: String,
}

impl Scan {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }
}

/// Call a set-returning function, e.g. `content_metric_calendar('1 days', ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    /// Function name
    pub function: String,
    /// Positional arguments
    pub args: Vec<Expr>,
}

/// Left-join two aliased relations and project from both sides
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Left input
    pub left: Box<PlanNode>,
    pub left_alias: String,
    /// Right input
    pub right: Box<PlanNode>,
    pub right_alias: String,
    /// Equality conditions, ANDed
    pub on: Vec<(Column, Column)>,
    /// Output expressions, qualified with the aliases above
    pub expressions: Vec<ProjectExpr>,
}

/// Filter rows (WHERE clause)
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Input relation
    pub input: Box<PlanNode>,
    /// Filter predicate
    pub predicate: Expr,
}

/// Aggregate (GROUP BY)
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Input relation
    pub input: Box<PlanNode>,
    /// GROUP BY expressions, also emitted as output columns
    pub group_by: Vec<ProjectExpr>,
    /// Aggregate expressions
    pub aggregates: Vec<AggregateExpr>,
}

/// Project specific columns or computed expressions
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Input relation
    pub input: Box<PlanNode>,
    /// Expressions to project with their aliases
    pub expressions: Vec<ProjectExpr>,
    /// SELECT DISTINCT
    pub distinct: bool,
}

/// A projected expression with its output alias
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectExpr {
    /// The expression to compute
    pub expr: Expr,
    /// Output column name
    pub alias: String,
}

impl ProjectExpr {
    pub fn new(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: alias.into(),
        }
    }

    /// Pass a column through under its own name
    pub fn column(column: Column) -> Self {
        let alias = column.name.clone();
        Self {
            expr: Expr::Column(column),
            alias,
        }
    }
}

/// Sort rows (ORDER BY)
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// Input relation
    pub input: Box<PlanNode>,
    /// Sort keys, most significant first
    pub sort_keys: Vec<SortKey>,
}

/// An ascending sort key
///
/// Every ordering in a timeseries plan runs forward in time; `last`
/// aggregates carry their own descending order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    /// Column to sort by
    pub column: Column,
}

impl SortKey {
    pub fn asc(column: Column) -> Self {
        Self { column }
    }
}
