//! Wire-format query input and its conversion into a [`QuerySpec`]

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;

use super::error::ConfigError;
use super::spec::{EntityId, QuerySpec, Transform, Unit};

/// One name or a list of names
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(name) => vec![name],
            OneOrMany::Many(names) => names,
        }
    }
}

/// Request body for timeseries queries
///
/// Caller input as it arrives over the wire: string-typed units, transforms
/// and dates. Convert with `QuerySpec::try_from`, which validates everything.
#[derive(Debug, Deserialize, Default)]
pub struct QueryRequest {
    #[serde(default)]
    pub ids: Vec<EntityId>,
    pub unit: Option<String>,
    pub sparse: Option<bool>,
    pub group_by_id: Option<bool>,
    pub transform: Option<String>,
    /// `"*"`, a metric name, or a list of metric names
    pub select: Option<OneOrMany>,
    pub exclude: Option<OneOrMany>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub sig_digits: Option<u32>,
}

impl TryFrom<QueryRequest> for QuerySpec {
    type Error = ConfigError;

    fn try_from(request: QueryRequest) -> Result<Self, Self::Error> {
        let mut builder = QuerySpec::builder(request.ids);

        if let Some(unit) = request.unit {
            builder = builder.unit(unit.parse::<Unit>()?);
        }
        if let Some(sparse) = request.sparse {
            builder = builder.sparse(sparse);
        }
        if let Some(group_by_id) = request.group_by_id {
            builder = builder.group_by_id(group_by_id);
        }
        if let Some(transform) = request.transform {
            builder = builder.transform(transform.parse::<Transform>()?);
        }
        match request.select.map(OneOrMany::into_vec) {
            None => {}
            Some(names) if names.iter().any(|n| n == "*") => builder = builder.select_all(),
            Some(names) => builder = builder.select(names),
        }
        if let Some(exclude) = request.exclude {
            builder = builder.exclude(exclude.into_vec());
        }
        if let Some(after) = request.after {
            builder = builder.after(parse_bound(&after, Bound::Lower)?);
        }
        if let Some(before) = request.before {
            builder = builder.before(parse_bound(&before, Bound::Upper)?);
        }
        if let Some(sig_digits) = request.sig_digits {
            builder = builder.sig_digits(sig_digits);
        }

        builder.build()
    }
}

impl QueryRequest {
    pub fn into_spec(self) -> Result<QuerySpec, ConfigError> {
        QuerySpec::try_from(self)
    }
}

/// Which end of the window a date bound closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// Parse a caller-supplied timestamp; date-only input means midnight UTC
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ConfigError> {
    parse_bound(input, Bound::Lower)
}

/// Parse one end of the query window.
///
/// A date-only upper bound covers the whole day, so `before=2015-04-03`
/// keeps measurements taken later on the 3rd.
pub fn parse_bound(input: &str, bound: Bound) -> Result<DateTime<Utc>, ConfigError> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(input.to_string()))?;
    let time = match bound {
        Bound::Lower => NaiveTime::from_hms_opt(0, 0, 0),
        Bound::Upper => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999),
    }
    .ok_or_else(|| ConfigError::InvalidDate(input.to_string()))?;
    Ok(date.and_time(time).and_utc())
}
