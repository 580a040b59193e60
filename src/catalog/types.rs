//! Metric kind and aggregation enumerations

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// MetricKind
// ============================================================================

/// How a metric is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Each observation is the amount for its own period
    Count,
    /// Each observation is a monotonically increasing running total
    Cumulative,
}

impl Default for MetricKind {
    fn default() -> Self {
        MetricKind::Count
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Count => write!(f, "count"),
            MetricKind::Cumulative => write!(f, "cumulative"),
        }
    }
}

/// Error when parsing a metric kind string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown metric kind '{input}'. Valid options: count, cumulative")]
pub struct ParseMetricKindError {
    pub input: String,
}

impl FromStr for MetricKind {
    type Err = ParseMetricKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "count" => Ok(MetricKind::Count),
            "cumulative" => Ok(MetricKind::Cumulative),
            _ => Err(ParseMetricKindError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for MetricKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MetricKind::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for MetricKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Function used to combine observations that fall into one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// Sum of values
    Sum,
    /// Average of values
    Avg,
    /// Maximum value
    Max,
    /// Minimum value
    Min,
    /// Most recent value in the bucket
    Last,
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Sum
    }
}

impl Aggregation {
    /// Whether a running total of this aggregation is meaningful
    pub fn is_additive(&self) -> bool {
        matches!(self, Aggregation::Sum)
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sum => write!(f, "sum"),
            Aggregation::Avg => write!(f, "avg"),
            Aggregation::Max => write!(f, "max"),
            Aggregation::Min => write!(f, "min"),
            Aggregation::Last => write!(f, "last"),
        }
    }
}

/// Error when parsing an aggregation string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown aggregation '{input}'. Valid options: sum, avg, max, min, last")]
pub struct ParseAggregationError {
    pub input: String,
}

impl FromStr for Aggregation {
    type Err = ParseAggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "avg" | "average" | "mean" => Ok(Aggregation::Avg),
            "max" | "maximum" => Ok(Aggregation::Max),
            "min" | "minimum" => Ok(Aggregation::Min),
            "last" | "latest" => Ok(Aggregation::Last),
            _ => Err(ParseAggregationError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for Aggregation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Aggregation::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Aggregation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
