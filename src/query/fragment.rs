//! Query fragments
//!
//! A [`Fragment`] is one piece of a request body: either a run of object
//! members (`"terms": {...}`, `"aggs": {...}`) or a bare clause such as a
//! `term` filter. Fragments are plain values that are joined into larger
//! fragments and only turned into JSON once, by the root constructor.
//!
//! Nothing is checked while fragments are being assembled. Mismatched
//! nesting (a clause where members belong, a member inside a filter list,
//! a key given twice) is reported when the tree is rendered.

use crate::query::error::{QueryError, QueryResult};
use serde_json::{Map, Value};

/// A composable, immutable piece of a query body
///
/// The empty fragment contributes nothing when joined, which is how
/// optional clauses drop out of a composition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    /// `"key": node` inside an object body
    Member(String, Node),
    /// A bare value, e.g. one entry of a filter array
    Element(Node),
}

/// Value position inside a fragment
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Scalar(Value),
    /// Braced object whose body is the fragment's members
    Object(Fragment),
    /// Bracketed array whose entries are the fragment's elements
    Array(Fragment),
    /// A value that cannot be represented; carries the reason
    Invalid(String),
}

impl Fragment {
    /// The empty fragment
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when joining this fragment would add nothing
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of top-level parts (members or clauses)
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn member(key: impl Into<String>, node: Node) -> Self {
        Self {
            parts: vec![Part::Member(key.into(), node)],
        }
    }

    pub(crate) fn element(node: Node) -> Self {
        Self {
            parts: vec![Part::Element(node)],
        }
    }

    /// `"key": value` for a scalar value
    ///
    /// `Value::from(f64)` maps NaN and infinities to `null`, so a null scalar
    /// is kept as an invalid node and reported when the tree is rendered.
    pub(crate) fn scalar(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::member(key, scalar_node(value.into()))
    }

    /// `"key": { body }`
    pub(crate) fn object(key: impl Into<String>, body: Fragment) -> Self {
        Self::member(key, Node::Object(body))
    }

    /// Textual form of the fragment without surrounding braces, parts
    /// separated by `,\n`.
    ///
    /// Useful for inspecting a single option, e.g. `"time_zone": "+05:45"`.
    pub fn to_text(&self) -> QueryResult<String> {
        let mut pieces = Vec::with_capacity(self.parts.len());

        for (i, part) in self.parts.iter().cloned().enumerate() {
            let piece = match part {
                Part::Member(key, node) => {
                    let value = node.into_value(&format!("$.{}", key))?;
                    format!(
                        "{}: {}",
                        serde_json::to_string(&key)?,
                        serde_json::to_string(&value)?
                    )
                }
                Part::Element(node) => {
                    serde_json::to_string(&node.into_value(&format!("$[{}]", i))?)?
                }
            };
            pieces.push(piece);
        }

        Ok(pieces.join(",\n"))
    }

    /// Render this fragment as the body of a JSON object.
    ///
    /// `path` names the object in diagnostics (`$` for the document root).
    pub(crate) fn into_object(self, path: &str) -> QueryResult<Map<String, Value>> {
        let mut map = Map::new();

        for part in self.parts {
            match part {
                Part::Member(key, node) => {
                    if map.contains_key(&key) {
                        return Err(QueryError::DuplicateKey {
                            path: path.to_string(),
                            key,
                        });
                    }
                    let child_path = format!("{}.{}", path, key);
                    let value = node.into_value(&child_path)?;
                    map.insert(key, value);
                }
                Part::Element(node) => {
                    return Err(QueryError::MalformedComposition {
                        path: path.to_string(),
                        reason: format!(
                            "bare {} where object members are expected",
                            node.describe()
                        ),
                    });
                }
            }
        }

        Ok(map)
    }

    /// Render this fragment as the entries of a JSON array.
    pub(crate) fn into_array(self, path: &str) -> QueryResult<Vec<Value>> {
        self.parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| match part {
                Part::Element(node) => node.into_value(&format!("{}[{}]", path, i)),
                Part::Member(key, _) => Err(QueryError::MalformedComposition {
                    path: path.to_string(),
                    reason: format!("member '{}' where array entries are expected", key),
                }),
            })
            .collect()
    }
}

impl Node {
    fn into_value(self, path: &str) -> QueryResult<Value> {
        match self {
            Node::Scalar(value) => Ok(value),
            Node::Object(body) => body.into_object(path).map(Value::Object),
            Node::Array(entries) => entries.into_array(path).map(Value::Array),
            Node::Invalid(reason) => Err(QueryError::MalformedComposition {
                path: path.to_string(),
                reason,
            }),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "value",
            Node::Object(_) => "clause",
            Node::Array(_) => "array",
            Node::Invalid(_) => "invalid value",
        }
    }
}

fn scalar_node(value: Value) -> Node {
    match value {
        Value::Null => Node::Invalid("scalar is null or a non-finite number".to_string()),
        value => Node::Scalar(value),
    }
}

impl FromIterator<Fragment> for Fragment {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().flat_map(|f| f.parts).collect(),
        }
    }
}

/// Join fragments in order, dropping empty ones.
pub fn join(fragments: impl IntoIterator<Item = Fragment>) -> Fragment {
    fragments.into_iter().collect()
}

/// Join `fragments` only when `condition` holds; otherwise the empty fragment.
///
/// ```
/// use esdsl::query::{range, when};
///
/// let period = "month";
/// let clause = when(period == "week", [range("now-7d", "now")]);
/// assert!(clause.is_empty());
/// ```
pub fn when(condition: bool, fragments: impl IntoIterator<Item = Fragment>) -> Fragment {
    if condition {
        join(fragments)
    } else {
        Fragment::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(fragment: Fragment) -> QueryResult<Value> {
        fragment.into_object("$").map(Value::Object)
    }

    #[test]
    fn test_join_preserves_order() {
        let joined = join([
            Fragment::scalar("a", 1),
            Fragment::empty(),
            Fragment::scalar("b", 2),
        ]);

        assert_eq!(joined.len(), 2);
        assert_eq!(render(joined).unwrap(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_join_of_nothing_is_empty() {
        assert!(join(Vec::<Fragment>::new()).is_empty());
        assert!(join([Fragment::empty(), Fragment::empty()]).is_empty());
    }

    #[test]
    fn test_when_false_equals_omission() {
        let with = join([
            Fragment::scalar("a", 1),
            when(false, [Fragment::scalar("b", 2)]),
        ]);
        let without = join([Fragment::scalar("a", 1)]);

        assert_eq!(with, without);
    }

    #[test]
    fn test_when_true_equals_direct() {
        let direct = join([Fragment::scalar("a", 1), Fragment::scalar("b", 2)]);
        let conditional = when(true, [Fragment::scalar("a", 1), Fragment::scalar("b", 2)]);

        assert_eq!(direct, conditional);
    }

    #[test]
    fn test_nested_object() {
        let fragment = Fragment::object("outer", Fragment::scalar("inner", "x"));
        assert_eq!(render(fragment).unwrap(), json!({"outer": {"inner": "x"}}));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let fragment = join([Fragment::scalar("a", 1), Fragment::scalar("a", 2)]);

        match render(fragment) {
            Err(QueryError::DuplicateKey { path, key }) => {
                assert_eq!(path, "$");
                assert_eq!(key, "a");
            }
            other => panic!("expected duplicate key error, got {:?}", other),
        }
    }

    #[test]
    fn test_element_in_object_rejected() {
        let clause = Fragment::element(Node::Scalar(json!("loose")));
        let fragment = Fragment::object("outer", clause);

        match render(fragment) {
            Err(QueryError::MalformedComposition { path, reason }) => {
                assert_eq!(path, "$.outer");
                assert!(reason.contains("bare value"));
            }
            other => panic!("expected malformed composition, got {:?}", other),
        }
    }

    #[test]
    fn test_member_in_array_rejected() {
        let fragment = Fragment::member("list", Node::Array(Fragment::scalar("k", 1)));

        match render(fragment) {
            Err(QueryError::MalformedComposition { path, reason }) => {
                assert_eq!(path, "$.list");
                assert!(reason.contains("member 'k'"));
            }
            other => panic!("expected malformed composition, got {:?}", other),
        }
    }

    #[test]
    fn test_array_entries() {
        let entries = join([
            Fragment::element(Node::Scalar(json!(1))),
            Fragment::element(Node::Object(Fragment::scalar("x", true))),
        ]);
        let fragment = Fragment::member("list", Node::Array(entries));

        assert_eq!(render(fragment).unwrap(), json!({"list": [1, {"x": true}]}));
    }

    #[test]
    fn test_to_text() {
        let fragment = join([
            Fragment::scalar("time_zone", "+05:45"),
            Fragment::object("order", Fragment::scalar("_key", "asc")),
        ]);

        assert_eq!(
            fragment.to_text().unwrap(),
            "\"time_zone\": \"+05:45\",\n\"order\": {\"_key\":\"asc\"}"
        );
        assert_eq!(Fragment::empty().to_text().unwrap(), "");
    }

    #[test]
    fn test_invalid_node_reports_path() {
        let fragment = Fragment::object(
            "stats",
            Fragment::member("percents", Node::Invalid("not a number".to_string())),
        );

        match render(fragment) {
            Err(QueryError::MalformedComposition { path, .. }) => {
                assert_eq!(path, "$.stats.percents");
            }
            other => panic!("expected malformed composition, got {:?}", other),
        }
    }
}
