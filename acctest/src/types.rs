//! Core value types for acctest
//!
//! `Scalar` is what a template context holds. `State` is what a harness
//! observed after applying a rendered configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Scalar represents a single context value substituted into a template
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Integer(i64::from(i))
    }
}

impl From<u32> for Scalar {
    fn from(i: u32) -> Self {
        Scalar::Integer(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Flat attribute map of one resource, keyed by flatmap path
/// (`name`, `network_interface.0.network`, `tags.#`)
pub type Attributes = BTreeMap<String, Value>;

/// State observed by a harness after an apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub resources: BTreeMap<String, Attributes>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, address: impl Into<String>, attributes: Attributes) -> Self {
        self.resources.insert(address.into(), attributes);
        self
    }

    pub fn insert_resource(&mut self, address: impl Into<String>, attributes: Attributes) {
        self.resources.insert(address.into(), attributes);
    }

    pub fn resource(&self, address: &str) -> Option<&Attributes> {
        self.resources.get(address)
    }

    pub fn attribute(&self, address: &str, key: &str) -> Option<&Value> {
        self.resource(address).and_then(|attrs| attrs.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Flattens a nested attribute object into flatmap form.
///
/// Lists produce `key.#` counts and indexed children, maps produce `key.%`
/// counts and named children. Top-level keys map directly.
pub fn flatten_attributes(value: &Value) -> Attributes {
    let mut out = Attributes::new();
    if let Value::Object(map) = value {
        for (key, child) in map {
            flatten_into(key, child, &mut out);
        }
    }
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Attributes) {
    match value {
        Value::Array(items) => {
            out.insert(format!("{}.#", prefix), Value::from(items.len()));
            for (idx, item) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, idx), item, out);
            }
        }
        Value::Object(map) => {
            out.insert(format!("{}.%", prefix), Value::from(map.len()));
            for (key, child) in map {
                flatten_into(&format!("{}.{}", prefix, key), child, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// String form of an attribute value, as compared by checks
pub fn attribute_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
