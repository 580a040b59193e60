//! The immutable description of one timeseries query

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

/// Identifier of the entity a series belongs to (content item or organization)
pub type EntityId = i64;

// ============================================================================
// Unit
// ============================================================================

/// Bucket granularity
///
/// Ordered from finest to coarsest. `Hour` is the granularity measurements are
/// stored at, so nothing finer can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Unit {
    /// Granularity of the stored measurements
    pub const MINIMUM: Unit = Unit::Hour;

    /// Field name understood by `date_trunc`
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Quarter => "quarter",
            Unit::Year => "year",
        }
    }

    /// Calendar step as a PostgreSQL interval, e.g. `1 days`
    pub fn step(&self) -> String {
        match self {
            // `quarter` is a date_trunc field but not an interval unit
            Unit::Quarter => "3 months".to_string(),
            unit => format!("1 {}s", unit.as_str()),
        }
    }

    pub fn is_minimum(&self) -> bool {
        *self == Unit::MINIMUM
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::MINIMUM
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.strip_suffix('s').unwrap_or(&lower) {
            "hour" => Ok(Unit::Hour),
            "day" => Ok(Unit::Day),
            "week" => Ok(Unit::Week),
            "month" => Ok(Unit::Month),
            "quarter" => Ok(Unit::Quarter),
            "year" => Ok(Unit::Year),
            "microsecond" | "millisecond" | "second" | "minute" => {
                Err(ConfigError::UnitBelowMinimum(s.to_string()))
            }
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Post-aggregation transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    #[default]
    None,
    /// Running total of each additive metric
    Cumulative,
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::None => write!(f, "none"),
            Transform::Cumulative => write!(f, "cumulative"),
        }
    }
}

impl FromStr for Transform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Transform::None),
            "cumulative" => Ok(Transform::Cumulative),
            "rolling_avg" | "roll_avg" | "per_change" | "median" | "avg" => {
                Err(ConfigError::UnsupportedTransform(s.to_string()))
            }
            _ => Err(ConfigError::UnknownTransform(s.to_string())),
        }
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Which metrics to return before exclusions are applied
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every metric in the catalog (`"*"`)
    #[default]
    All,
    /// Only the named metrics; unknown names are ignored
    Names(Vec<String>),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

// ============================================================================
// QuerySpec
// ============================================================================

/// A validated, immutable timeseries query.
///
/// Built once per request through [`QuerySpecBuilder`] or from a
/// [`QueryRequest`](super::QueryRequest); there are no setters.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    entity_ids: BTreeSet<EntityId>,
    unit: Unit,
    sparse: bool,
    group_by_id: bool,
    transform: Transform,
    select: Selection,
    exclude: Vec<String>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    sig_digits: u32,
}

impl QuerySpec {
    pub const DEFAULT_SIG_DIGITS: u32 = 2;

    pub fn builder<I>(entity_ids: I) -> QuerySpecBuilder
    where
        I: IntoIterator<Item = EntityId>,
    {
        QuerySpecBuilder::new(entity_ids)
    }

    /// Entity ids in ascending order
    pub fn entity_ids(&self) -> &BTreeSet<EntityId> {
        &self.entity_ids
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn sparse(&self) -> bool {
        self.sparse
    }

    pub fn group_by_id(&self) -> bool {
        self.group_by_id
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn select(&self) -> &Selection {
        &self.select
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn after(&self) -> Option<DateTime<Utc>> {
        self.after
    }

    pub fn before(&self) -> Option<DateTime<Utc>> {
        self.before
    }

    pub fn sig_digits(&self) -> u32 {
        self.sig_digits
    }

    /// Whether any date bound was given
    pub fn has_date_filter(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Whether the raw per-hour rows already form one row per output bucket.
    ///
    /// True only at hourly granularity with per-entity grouping; without
    /// grouping, rows of different entities still have to be collapsed.
    pub fn native_granularity(&self) -> bool {
        self.unit.is_minimum() && self.group_by_id
    }
}

/// Builder for [`QuerySpec`]
#[derive(Debug, Clone)]
pub struct QuerySpecBuilder {
    entity_ids: BTreeSet<EntityId>,
    unit: Unit,
    sparse: bool,
    group_by_id: bool,
    transform: Transform,
    select: Selection,
    exclude: Vec<String>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    sig_digits: u32,
}

impl QuerySpecBuilder {
    pub fn new<I>(entity_ids: I) -> Self
    where
        I: IntoIterator<Item = EntityId>,
    {
        Self {
            entity_ids: entity_ids.into_iter().collect(),
            unit: Unit::default(),
            sparse: true,
            group_by_id: true,
            transform: Transform::None,
            select: Selection::All,
            exclude: Vec::new(),
            after: None,
            before: None,
            sig_digits: QuerySpec::DEFAULT_SIG_DIGITS,
        }
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn group_by_id(mut self, group_by_id: bool) -> Self {
        self.group_by_id = group_by_id;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn select<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Selection::Names(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn select_all(mut self) -> Self {
        self.select = Selection::All;
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn after(mut self, after: DateTime<Utc>) -> Self {
        self.after = Some(after);
        self
    }

    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }

    pub fn sig_digits(mut self, sig_digits: u32) -> Self {
        self.sig_digits = sig_digits;
        self
    }

    /// Validate and freeze the query
    pub fn build(self) -> Result<QuerySpec, ConfigError> {
        if self.entity_ids.is_empty() {
            return Err(ConfigError::EmptyEntityIds);
        }
        if let (Some(after), Some(before)) = (self.after, self.before) {
            if after > before {
                return Err(ConfigError::InvertedWindow { after, before });
            }
        }

        Ok(QuerySpec {
            entity_ids: self.entity_ids,
            unit: self.unit,
            sparse: self.sparse,
            group_by_id: self.group_by_id,
            transform: self.transform,
            select: self.select,
            exclude: self.exclude,
            after: self.after,
            before: self.before,
            sig_digits: self.sig_digits,
        })
    }
}
