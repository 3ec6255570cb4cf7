//! Query rendering
//!
//! The root constructor wraps a composition in the top-level envelope,
//! validates the tree and serializes it once. Object keys come out sorted
//! and number literals are kept exactly as written.

use crate::query::error::QueryResult;
use crate::query::fragment::{join, Fragment};
use serde_json::Value;

/// Build the request body as a JSON value.
///
/// The envelope always carries `"size": 0`: only aggregation results are
/// wanted, never the matching documents.
pub fn query_value(children: impl IntoIterator<Item = Fragment>) -> QueryResult<Value> {
    let body = join(std::iter::once(Fragment::scalar("size", 0)).chain(children));
    body.into_object("$").map(Value::Object)
}

/// Build the request body as compact JSON text.
pub fn query(children: impl IntoIterator<Item = Fragment>) -> QueryResult<String> {
    let value = query_value(children)?;
    let text = serde_json::to_string(&value)?;

    tracing::debug!(bytes = text.len(), "Rendered query");
    Ok(text)
}

/// Re-serialize JSON text with two-space indentation.
pub fn pretty(text: &str) -> QueryResult<String> {
    let value: Value = serde_json::from_str(text)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Re-serialize JSON text without insignificant whitespace.
pub fn compact(text: &str) -> QueryResult<String> {
    let value: Value = serde_json::from_str(text)?;
    Ok(serde_json::to_string(&value)?)
}
