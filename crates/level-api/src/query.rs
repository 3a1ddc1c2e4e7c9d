// Query-parameter normalization.
//
// Callers assemble a `CandidateQuery` from typed filters, cursors, and
// free-form key/value pairs, then `sanitize_query` drops everything that
// is unset, null, or an empty string. `0` and `false` are real values.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A scalar query-string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl QueryValue {
    /// `""` is the only value that counts as "not set" once present.
    fn is_blank(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for QueryValue {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u32> for QueryValue {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for QueryValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

// ── Candidate ───────────────────────────────────────────────────────

/// An unsanitized, insertion-ordered parameter set.
///
/// `None` marks a parameter that was not set (or null). Setting a key twice
/// keeps its first position and the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateQuery {
    entries: IndexMap<String, Option<QueryValue>>,
}

impl CandidateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an optional value.
    pub fn set(mut self, key: &str, value: Option<impl Into<QueryValue>>) -> Self {
        self.entries.insert(key.to_owned(), value.map(Into::into));
        self
    }

    /// Set a present value.
    pub fn set_value(self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.set(key, Some(value))
    }

    /// Set `key=true` only when `flag` is on; otherwise leave it unset.
    pub fn flag(self, key: &str, flag: bool) -> Self {
        self.set(key, flag.then_some(true))
    }

    /// Merge free-form pairs last so they overwrite typed filters.
    pub fn merge<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        for (key, value) in pairs {
            self.entries.insert(key.into(), Some(value.into()));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&QueryValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

// ── Sanitized query ─────────────────────────────────────────────────

/// A clean parameter set: no unset, null, or empty-string values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Query {
    entries: IndexMap<String, QueryValue>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// Insert a value, ignoring blanks so the invariant holds.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let value = value.into();
        if !value.is_blank() {
            self.entries.insert(key.into(), value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stringified pairs for the query string, in insertion order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

/// Drop every entry that is unset, null, or `""`.
pub fn sanitize_query(candidate: &CandidateQuery) -> Query {
    let entries = candidate
        .entries
        .iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_blank() => Some((key.clone(), v.clone())),
            _ => None,
        })
        .collect();
    Query { entries }
}

// ── Free-form key/value pairs ───────────────────────────────────────

/// One row of a free-form key/value collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

/// Parses `key=value`; a bare `key` yields an empty value.
impl FromStr for KeyValuePair {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.split_once('=').unwrap_or((s, ""));
        Ok(Self::new(key, value))
    }
}

/// Collapse pairs into a map: keys are trimmed, blank keys skipped,
/// missing values become `""`, later duplicates win.
pub fn build_key_value_collection(pairs: &[KeyValuePair]) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for pair in pairs {
        let key = pair.key.as_deref().map(str::trim).unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_owned(), pair.value.clone().unwrap_or_default());
    }
    out
}
