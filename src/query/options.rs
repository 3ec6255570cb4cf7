//! Bucket options
//!
//! Single-member fragments spliced into a histogram's option list.

use crate::query::fragment::Fragment;
use serde_json::Value;

/// Sort direction for bucket ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl Direction {
    /// Wire form used by the query language
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `"interval": value`
///
/// Date histograms take an expression such as `"30m"`, numeric histograms
/// take a number.
pub fn interval(value: impl Into<Value>) -> Fragment {
    Fragment::scalar("interval", value)
}

/// `"min_doc_count": n`
pub fn min_doc_count(count: u64) -> Fragment {
    Fragment::scalar("min_doc_count", count)
}

/// `"missing": value`, the bucket assigned to documents lacking the field
pub fn missing(value: impl Into<Value>) -> Fragment {
    Fragment::scalar("missing", value)
}

/// `"extended_bounds": {"min": min, "max": max}`
pub fn extended_bounds(min: impl Into<Value>, max: impl Into<Value>) -> Fragment {
    Fragment::object(
        "extended_bounds",
        Fragment::from_iter([Fragment::scalar("min", min), Fragment::scalar("max", max)]),
    )
}

/// `"order": {key: "asc"|"desc"}`
pub fn order(key: impl Into<String>, direction: Direction) -> Fragment {
    Fragment::object("order", Fragment::scalar(key, direction.as_str()))
}
