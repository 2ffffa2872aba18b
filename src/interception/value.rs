// src/interception/value.rs
//! Runtime-typed argument values
//!
//! Arguments crossing an intercepted call site are heterogeneous and only
//! known at runtime. `ArgValue` is the tagged union they are carried in;
//! every accessor is fallible and returns `None` instead of failing.

use serde::Serialize;
use std::collections::BTreeMap;

/// One argument or return value observed at a call site
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<ArgValue>),
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    /// Build a map value from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<ArgValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        ArgValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ArgValue>> {
        match self {
            ArgValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up an entry if this value is a map
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Textual form used in emitted events
    ///
    /// Scalars render as themselves, bytes as lossy UTF-8, and containers
    /// as compact JSON. `Null` has no textual form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ArgValue::Null => None,
            ArgValue::Bool(b) => Some(b.to_string()),
            ArgValue::Int(i) => Some(i.to_string()),
            ArgValue::Float(f) => Some(f.to_string()),
            ArgValue::Str(s) => Some(s.clone()),
            ArgValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            ArgValue::List(_) | ArgValue::Map(_) => serde_json::to_string(self).ok(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<f64> for ArgValue {
    fn from(f: f64) -> Self {
        ArgValue::Float(f)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(b: Vec<u8>) -> Self {
        ArgValue::Bytes(b)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ArgValue::Null)
    }
}
