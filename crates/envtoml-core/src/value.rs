//! Document value types
//!
//! A loaded document is a tree of [`Value`]s whose root is always a
//! mapping. Mappings keep the key order of the source text.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use toml::value::Datetime;

use crate::error::{Error, Result};

/// A document value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    /// Whatever the float parser produced may replace this variant
    Float(f64),
    Bool(bool),
    /// Offset datetime, local datetime, local date or local time
    Datetime(Datetime),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    pub fn is_datetime(&self) -> bool {
        matches!(self, Value::Datetime(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a nested value by a path such as `database.host` or
    /// `servers[1].name`; the empty path is the value itself
    pub fn get_path(&self, path: &str) -> Result<&Value> {
        parse_path(path)?.into_iter().try_fold(self, |node, step| {
            let next = match (step, node) {
                (Step::Key(key), Value::Mapping(map)) => map.get(key),
                (Step::Index(index), Value::Sequence(items)) => items.get(index),
                _ => None,
            };
            next.ok_or_else(|| Error::path_not_found(path))
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Datetime(_) => "datetime",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Convert into a `toml::Value` for re-emitting TOML text
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Value::String(s) => toml::Value::String(s.clone()),
            Value::Integer(i) => toml::Value::Integer(*i),
            Value::Float(f) => toml::Value::Float(*f),
            Value::Bool(b) => toml::Value::Boolean(*b),
            Value::Datetime(dt) => toml::Value::Datetime(dt.clone()),
            Value::Sequence(items) => {
                toml::Value::Array(items.iter().map(Value::to_toml).collect())
            }
            Value::Mapping(map) => toml::Value::Table(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_toml()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Datetimes travel as their RFC 3339 text outside of TOML
            Value::Datetime(dt) => serializer.collect_str(dt),
            Value::Sequence(items) => items.serialize(serializer),
            Value::Mapping(map) => map.serialize(serializer),
        }
    }
}

/// Strings print bare; everything else prints as inline TOML
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_toml()),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse_path(path: &str) -> Result<Vec<Step<'_>>> {
    let invalid = || Error::parse(format!("Invalid path: {}", path));
    let mut steps = Vec::new();

    for part in path.split('.').filter(|part| !part.is_empty()) {
        let (key, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));
        if key.contains(']') {
            return Err(invalid());
        }
        if !key.is_empty() {
            steps.push(Step::Key(key));
        }

        // `rest` is empty or a run of `[N]` suffixes
        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(invalid)?;
            let index = rest[1..close].parse().map_err(|_| invalid())?;
            steps.push(Step::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(invalid());
            }
        }
    }

    Ok(steps)
}
