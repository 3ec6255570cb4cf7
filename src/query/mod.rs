//! Query Composer
//!
//! Builds search-engine aggregation request bodies from typed fragments:
//!
//! - **Fragments**: composable pieces of a body, joined in order
//! - **Filters**: `term` and `range` clauses gathered into a reusable set
//! - **Aggregations**: metric and bucket clauses nested under named `aggs`
//! - **Options**: histogram settings such as interval, bounds and time zone
//! - **Rendering**: the `"size": 0` envelope plus compact/pretty output
//!
//! # Example
//!
//! ```rust
//! use esdsl::query::{aggs, filter, pretty, query, range, sum, term, terms, when};
//!
//! let period = "month";
//!
//! let body = query([aggs(
//!     "results",
//!     [filter([
//!         term("user.login", "tj"),
//!         when(period == "week", [range("now-7d", "now")]),
//!         when(period == "month", [range("now-1M", "now")]),
//!     ])
//!     .apply([aggs(
//!         "repos",
//!         [
//!             terms("repository.name.keyword", 100),
//!             aggs("duration_sum", [sum("duration")]),
//!         ],
//!     )])],
//! )])?;
//!
//! println!("{}", pretty(&body)?);
//! # Ok::<(), esdsl::query::QueryError>(())
//! ```

mod aggs;
mod error;
mod filters;
mod fragment;
mod options;
mod render;
mod timezone;

/// Field that `range` and `date_histogram` target unless told otherwise
pub const TIMESTAMP_FIELD: &str = "timestamp";

pub use aggs::{
    agg, aggs, aggs_of, avg, date_histogram, date_histogram_on, histogram, max, metric, min,
    percentiles, stats, sum, terms, Metric,
};
pub use error::{QueryError, QueryResult};
pub use filters::{filter, range, range_on, term, FilterSet};
pub use fragment::{join, when, Fragment};
pub use options::{extended_bounds, interval, min_doc_count, missing, order, Direction};
pub use render::{compact, pretty, query, query_value};
pub use timezone::{
    local_zone_name, parse_fixed_offset, resolve_offset, time_zone, time_zone_at,
    time_zone_with_fallback, UtcOffset, DEFAULT_FALLBACK_ZONE,
};
