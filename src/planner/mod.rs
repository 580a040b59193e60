//! Query planner (verb module)
//!
//! Transforms a QuerySpec and its selected metrics into a logical plan
//! (PlanNode), one stage at a time.

mod build;
mod error;
mod stages;

pub use build::{plan_query, OutputColumns, QueryPlan, StageKind};
pub use error::PlanError;
pub use stages::{aggregate_stage, cumulative_stage, densify_stage, init_stage, StageContext};
