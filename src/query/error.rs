//! Query error types
//!
//! Defines all error conditions that can occur while composing and rendering
//! a query body.

use thiserror::Error;

/// Errors that can occur during query composition
#[derive(Error, Debug)]
pub enum QueryError {
    /// Fragments were nested in a way that does not form a JSON document
    #[error("Malformed composition at {path}: {reason}")]
    MalformedComposition {
        /// Location of the offending part, e.g. `$.aggs.results`
        path: String,
        /// What was found where
        reason: String,
    },

    /// The same key was supplied twice within one object
    #[error("Duplicate key '{key}' at {path}")]
    DuplicateKey {
        /// Object holding both members, e.g. `$.aggs`
        path: String,
        /// The repeated key
        key: String,
    },

    /// Time zone is neither a fixed offset nor a known zone name
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Input text handed to a normalization pass is not JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
