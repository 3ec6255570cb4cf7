//! # esdsl
//!
//! A composable query DSL for search-engine aggregation requests. Queries are
//! assembled from small typed fragments and rendered once into a compact or
//! pretty JSON request body.
//!
//! ## Features
//!
//! - **Typed fragments**: filters, metric and bucket aggregations, options
//! - **Reusable filter sets**: define a filter once, apply it to many bodies
//! - **Conditional clauses**: `when` drops fragments without call-site branching
//! - **Time zones**: fixed offsets or IANA names resolved to the current offset
//! - **Checked output**: malformed compositions are errors, never bad JSON
//!
//! ## Modules
//!
//! - [`query`]: Fragment constructors, combinators and rendering
//! - [`config`]: TOML/environment configuration for the CLI
//!
//! ## Quick Start
//!
//! ```rust
//! use esdsl::query::{aggs, filter, query, range, sum, term, terms};
//!
//! let body = query([aggs(
//!     "results",
//!     [filter([term("user.login", "tj"), range("now-7d", "now")]).apply([aggs(
//!         "repos",
//!         [
//!             terms("repository.name.keyword", 100),
//!             aggs("duration_sum", [sum("duration")]),
//!         ],
//!     )])],
//! )])?;
//!
//! assert!(body.starts_with(r#"{"aggs":{"results":"#));
//! assert!(body.ends_with(r#""size":0}"#));
//! # Ok::<(), esdsl::QueryError>(())
//! ```

pub mod config;
pub mod query;

// Re-export top-level types for convenience
pub use query::{Direction, FilterSet, Fragment, Metric, QueryError, QueryResult, UtcOffset};

pub use config::{Config, ConfigError, LoggingConfig, QueryConfig};
