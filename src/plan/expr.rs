//! Expression types for the logical plan

use chrono::{DateTime, Utc};

use super::node::SortKey;
use crate::catalog::Aggregation;
use crate::query::Unit;

/// A column reference
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Relation alias, empty when unqualified
    pub table: String,
    /// Column name
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Create an unqualified column reference (no table prefix)
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            table: String::new(),
            name: name.into(),
        }
    }
}

/// Scalar expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(Column),
    /// Literal value
    Literal(Literal),
    /// Binary comparison (e.g., a >= b)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// IN expression (column IN (values))
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
    },
    /// AND of one or more expressions
    And(Vec<Expr>),
    /// Subtraction: a - b
    Subtract(Box<Expr>, Box<Expr>),
    /// First non-null argument
    Coalesce(Vec<Expr>),
    /// Numeric value of one key in a JSON document column
    JsonNumber { document: Column, key: String },
    /// Truncate a timestamp to the start of its bucket
    DateTrunc { unit: Unit, expr: Box<Expr> },
    /// Window function over an ordered partition
    Window {
        func: WindowFunction,
        partition_by: Vec<Column>,
        order_by: Vec<SortKey>,
    },
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(Column::unqualified(name))
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column(Column::new(table, name))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn compare(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// Functions usable in a window expression
#[derive(Debug, Clone, PartialEq)]
pub enum WindowFunction {
    /// Value of the previous row in the partition
    Lag(Box<Expr>),
    /// Running sum up to the current row
    Sum(Box<Expr>),
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `NULL` typed as `timestamptz`
    NullTimestamp,
    Int(i64),
    String(String),
    Timestamp(DateTime<Utc>),
    /// `bigint[]` array
    IntArray(Vec<i64>),
}

/// Inclusive range comparisons used by date bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    LtEq,
    GtEq,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::LtEq => "<=",
            BinaryOperator::GtEq => ">=",
        }
    }
}

/// An aggregate expression: func(expr) AS alias
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub func: Aggregation,
    pub expr: Expr,
    pub alias: String,
    /// Ordering for order-sensitive aggregates (`last`)
    pub order_by: Option<Column>,
    /// Round the aggregate to this many decimal places
    pub precision: Option<u32>,
}
