//! Dynamic data values bound into the observation graph.
//!
//! The engine observes plain data, so it needs a value representation that
//! can hold scalars and nested objects without a schema. Maps are `BTreeMap`
//! for deterministic iteration.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::{BindError, BindResult};

/// A scalar or nested-object value.
///
/// Arrays are deliberately absent: list diffing is outside the engine's
/// scope, and the data loader rejects them up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Member lookup; `None` unless `self` is an object holding `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a parsed TOML value into a bindable value.
    ///
    /// `path` names the property being converted, for error reporting.
    /// Arrays and datetimes have no binding semantics and are rejected.
    pub fn from_toml(value: toml::Value, path: &str) -> BindResult<Value> {
        match value {
            toml::Value::String(s) => Ok(Value::String(s)),
            toml::Value::Integer(i) => Ok(Value::Integer(i)),
            toml::Value::Float(f) => Ok(Value::Float(f)),
            toml::Value::Boolean(b) => Ok(Value::Bool(b)),
            toml::Value::Datetime(_) => Err(BindError::UnsupportedValue {
                path: path.to_string(),
                reason: "datetime values are not bindable".to_string(),
            }),
            toml::Value::Array(_) => Err(BindError::UnsupportedValue {
                path: path.to_string(),
                reason: "array values are not bindable".to_string(),
            }),
            toml::Value::Table(table) => {
                let mut map = BTreeMap::new();
                for (name, nested) in table {
                    let nested_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    map.insert(name, Value::from_toml(nested, &nested_path)?);
                }
                Ok(Value::Object(map))
            }
        }
    }
}

/// Derive a child path's value from its parent's new value by member name.
///
/// Yields `None` when the parent carries no value, is not an object, or
/// lacks the member ("undefined" in dynamic-language terms).
pub fn project<'a>(parent: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    parent.and_then(|value| value.get(name))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Object(map) => {
                let body = map.iter().map(|(k, v)| format!("{k} = {v}")).join(", ");
                write!(f, "{{{body}}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}
