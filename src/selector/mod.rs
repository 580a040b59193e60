//! Metric selector module
//!
//! Picks which catalog metrics a query reads.

mod select;

pub use select::{select_metrics, SelectedMetrics};
