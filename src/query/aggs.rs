//! Aggregation clauses
//!
//! Metric aggregations (`sum`, `avg`, `min`, `max`, `stats`, `percentiles`),
//! bucket aggregations (`terms`, `histogram`, `date_histogram`) and the
//! `aggs` blocks that name and nest them.
//!
//! # Example
//!
//! ```
//! use esdsl::query::{agg, aggs, aggs_of, query, sum, terms};
//!
//! // One named aggregation
//! let repos = aggs("repos", [terms("repository.name.keyword", 100)]);
//!
//! // Several siblings under one "aggs" key
//! let totals = aggs_of([agg("foo", [sum("count")]), agg("bar", [sum("count")])]);
//!
//! assert!(query([repos]).is_ok());
//! assert!(query([totals]).is_ok());
//! ```

use crate::query::fragment::{join, Fragment, Node};
use crate::query::options;
use crate::query::TIMESTAMP_FIELD;
use serde_json::{Number, Value};

/// Single-field metric aggregations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Sum of values
    Sum,
    /// Average of values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Count, min, max, avg and sum in one pass
    Stats,
}

impl Metric {
    /// Clause key in a request body
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Stats => "stats",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sum" => Some(Self::Sum),
            "avg" | "average" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn field(name: impl Into<String>) -> Fragment {
    let name: String = name.into();
    Fragment::scalar("field", name)
}

/// `"<kind>": {"field": field}`
pub fn metric(kind: Metric, name: impl Into<String>) -> Fragment {
    Fragment::object(kind.as_str(), field(name))
}

/// Sum agg of the given field
pub fn sum(field: impl Into<String>) -> Fragment {
    metric(Metric::Sum, field)
}

/// Avg agg of the given field
pub fn avg(field: impl Into<String>) -> Fragment {
    metric(Metric::Avg, field)
}

/// Min agg of the given field
pub fn min(field: impl Into<String>) -> Fragment {
    metric(Metric::Min, field)
}

/// Max agg of the given field
pub fn max(field: impl Into<String>) -> Fragment {
    metric(Metric::Max, field)
}

/// Stats agg of the given field
pub fn stats(field: impl Into<String>) -> Fragment {
    metric(Metric::Stats, field)
}

/// Percentiles over `name`, emitted under the `stats` key.
///
/// Each percent is written with exactly two decimals (`99.9` becomes
/// `99.90`), in the order given. With no percents the key is left out and
/// the engine's defaults apply.
pub fn percentiles(name: impl Into<String>, percents: &[f64]) -> Fragment {
    let mut body = field(name);

    if !percents.is_empty() {
        let entries: Fragment = percents
            .iter()
            .map(|p| Fragment::element(percent(*p)))
            .collect();
        body = join([body, Fragment::member("percents", Node::Array(entries))]);
    }

    Fragment::object(Metric::Stats.as_str(), body)
}

fn percent(value: f64) -> Node {
    if !value.is_finite() {
        return Node::Invalid(format!("percentile {} is not a finite number", value));
    }

    match format!("{:.2}", value).parse::<Number>() {
        Ok(number) => Node::Scalar(Value::Number(number)),
        Err(e) => Node::Invalid(format!("percentile {}: {}", value, e)),
    }
}

/// `"terms": {"field": field, "size": size}`
pub fn terms(name: impl Into<String>, size: usize) -> Fragment {
    Fragment::object("terms", join([field(name), Fragment::scalar("size", size)]))
}

/// Date histogram over the timestamp field with the given interval
///
/// `options` (e.g. [`time_zone`](crate::query::time_zone)) are merged into
/// the histogram body.
pub fn date_histogram(
    interval: impl Into<String>,
    options: impl IntoIterator<Item = Fragment>,
) -> Fragment {
    let interval: String = interval.into();
    date_histogram_on(
        TIMESTAMP_FIELD,
        std::iter::once(options::interval(interval)).chain(options),
    )
}

/// Date histogram over an explicit field; the interval is one of `options`.
pub fn date_histogram_on(
    name: impl Into<String>,
    options: impl IntoIterator<Item = Fragment>,
) -> Fragment {
    Fragment::object(
        "date_histogram",
        join(std::iter::once(field(name)).chain(options)),
    )
}

/// `"histogram": {"field": field, ..options}`
pub fn histogram(
    name: impl Into<String>,
    options: impl IntoIterator<Item = Fragment>,
) -> Fragment {
    Fragment::object("histogram", join(std::iter::once(field(name)).chain(options)))
}

/// `"aggs": {name: {children}}`
pub fn aggs(name: impl Into<String>, children: impl IntoIterator<Item = Fragment>) -> Fragment {
    aggs_of([agg(name, children)])
}

/// A named aggregation, `name: {children}`, for use inside [`aggs_of`]
pub fn agg(name: impl Into<String>, children: impl IntoIterator<Item = Fragment>) -> Fragment {
    Fragment::object(name, join(children))
}

/// `"aggs": {..}` holding several sibling aggregations
pub fn aggs_of(aggs: impl IntoIterator<Item = Fragment>) -> Fragment {
    Fragment::object("aggs", join(aggs))
}
