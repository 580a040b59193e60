//! Logical plan types (noun module)
//!
//! Represents a relational algebra tree that the emitter renders to SQL.

mod expr;
mod node;

pub use expr::{AggregateExpr, BinaryOperator, Column, Expr, Literal, WindowFunction};
pub use node::{
    Aggregate, Calendar, Filter, Join, PlanNode, Project, ProjectExpr, Scan, Sort, SortKey,
};
