//! Loosely-typed parameter values
//!
//! Provider parameters, template parameter defaults and custom element
//! properties arrive from YAML with whatever scalar type the author wrote.
//! [`Value`] keeps them in a small tagged union; integers and floats collapse
//! into a single numeric variant so `width: 120` and `width: 120.0` behave
//! identically everywhere.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named parameter set handed to providers and templates
pub type Params = IndexMap<String, Value>;

/// A dynamically-typed value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by conditional substitution blocks.
    ///
    /// `false`, `0`, the empty string, null and empty collections are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

/// Format a number the way authors wrote it: integral values lose the fraction.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("map[")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_str("]")
            }
        }
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_and_float_yaml_collapse_to_number() {
        let params: Params = serde_yaml::from_str("a: 120\nb: 120.0\nc: \"120\"").unwrap();
        assert_eq!(params["a"], Value::Number(120.0));
        assert_eq!(params["a"], params["b"]);
        assert_eq!(params["c"], Value::String("120".into()));
    }

    #[test]
    fn test_nested_values_deserialize() {
        let value: Value = serde_yaml::from_str("{enabled: true, tags: [a, b], empty: ~}").unwrap();
        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["enabled"], Value::Bool(true));
        assert_eq!(map["tags"], Value::from(vec!["a", "b"]));
        assert!(map["empty"].is_null());
    }

    #[test]
    fn test_display_drops_integral_fraction() {
        assert_eq!(Value::Number(120.0).to_string(), "120");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "[1 2]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
    }
}
