//! Filter clauses
//!
//! Leaf clauses (`range`, `term`) are bare elements meant for a filter list.
//! A [`FilterSet`] gathers them once and can then be applied to any number
//! of aggregation bodies:
//!
//! ```
//! use esdsl::query::{aggs, filter, query, range, sum, term};
//!
//! let recent = filter([term("user.login", "tj"), range("now-7d", "now")]);
//!
//! let total = query([aggs("results", [recent.apply([aggs("sum", [sum("duration")])])])]);
//! let peak = query([aggs("results", [recent.apply([aggs("max", [esdsl::query::max("duration")])])])]);
//!
//! assert!(total.is_ok());
//! assert!(peak.is_ok());
//! ```

use crate::query::fragment::{join, Fragment, Node};
use crate::query::TIMESTAMP_FIELD;
use serde_json::Value;

/// `{"range": {"timestamp": {"gte": gte, "lte": lte}}}`
///
/// Bounds are passed through untouched, so both absolute timestamps and
/// date math such as `now-1M` work.
pub fn range(gte: impl Into<String>, lte: impl Into<String>) -> Fragment {
    range_on(TIMESTAMP_FIELD, gte, lte)
}

/// Range clause over an explicit field
pub fn range_on(
    field: impl Into<String>,
    gte: impl Into<String>,
    lte: impl Into<String>,
) -> Fragment {
    let gte: String = gte.into();
    let lte: String = lte.into();
    let bounds = join([Fragment::scalar("gte", gte), Fragment::scalar("lte", lte)]);

    Fragment::element(Node::Object(Fragment::object(
        "range",
        Fragment::object(field, bounds),
    )))
}

/// `{"term": {field: value}}`, an exact match
pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Fragment {
    Fragment::element(Node::Object(Fragment::object(
        "term",
        Fragment::scalar(field, value),
    )))
}

/// A reusable set of filter clauses
///
/// Empty clauses (from [`when`](crate::query::when)) are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Fragment,
}

impl FilterSet {
    /// Collect filter clauses into a set
    pub fn new(filters: impl IntoIterator<Item = Fragment>) -> Self {
        Self {
            filters: join(filters),
        }
    }

    /// Add one more clause
    pub fn with(self, clause: Fragment) -> Self {
        Self {
            filters: join([self.filters, clause]),
        }
    }

    /// Number of clauses in the set
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True when the set holds no clauses
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Emit `"filter": {"bool": {"filter": [..]}}` followed by `body`.
    pub fn apply(&self, body: impl IntoIterator<Item = Fragment>) -> Fragment {
        let clause = Fragment::object(
            "filter",
            Fragment::object(
                "bool",
                Fragment::member("filter", Node::Array(self.filters.clone())),
            ),
        );

        join(std::iter::once(clause).chain(body))
    }
}

/// Shorthand for [`FilterSet::new`]
pub fn filter(filters: impl IntoIterator<Item = Fragment>) -> FilterSet {
    FilterSet::new(filters)
}
