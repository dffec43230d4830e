//! TOML format backend
//!
//! The walker needs two capabilities from the underlying format: parsing a
//! whole document into a [`Value`] tree, and parsing a single bare literal
//! (`true`, `3.14`, `{z = 123}`, ...) into one [`Value`]. [`TomlBackend`]
//! names them; [`TomlCrateBackend`] provides them on top of the `toml` crate.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result, SourceLocation};
use crate::value::Value;

/// Parser applied to every bare floating-point literal
///
/// Receives the literal text and returns the value to store in its place,
/// so a caller can keep full precision by returning a string, or adjust the
/// number.
#[derive(Clone)]
pub struct FloatParser(Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>);

impl FloatParser {
    /// Create a float parser from a function
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    /// Parse one float literal
    pub fn parse(&self, text: &str) -> Result<Value> {
        (self.0)(text)
    }
}

impl Default for FloatParser {
    fn default() -> Self {
        Self::new(|text| parse_f64(text).map(Value::Float))
    }
}

impl fmt::Debug for FloatParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FloatParser(..)")
    }
}

/// Parse TOML float text (`1_000.5`, `6.02e23`, `inf`, `-nan`) into an `f64`
pub fn parse_f64(text: &str) -> Result<f64> {
    let cleaned = text.trim().replace('_', "");
    cleaned
        .parse::<f64>()
        .map_err(|e| Error::parse(format!("Invalid float '{}': {}", text, e)))
}

/// Capabilities the walker needs from a TOML implementation
pub trait TomlBackend: Send + Sync {
    /// Parse a complete document; the root is always a mapping
    fn parse_document(&self, text: &str, parse_float: &FloatParser) -> Result<Value>;

    /// Parse one bare value, such as the right-hand side of `key = ...`
    fn parse_literal(&self, text: &str, parse_float: &FloatParser) -> Result<Value>;
}

/// Backend built on the `toml` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCrateBackend;

impl TomlBackend for TomlCrateBackend {
    fn parse_document(&self, text: &str, parse_float: &FloatParser) -> Result<Value> {
        let table: toml::Table = toml::from_str(text).map_err(|e| syntax_error(text, &e))?;
        convert_table(table, parse_float)
    }

    fn parse_literal(&self, text: &str, parse_float: &FloatParser) -> Result<Value> {
        let value = toml::Value::deserialize(toml::de::ValueDeserializer::new(text))
            .map_err(|e| syntax_error(text, &e))?;

        match value {
            // A bare float gets its own text, not the re-rendered number
            toml::Value::Float(_) => parse_float.parse(text.trim()),
            other => convert(other, parse_float),
        }
    }
}

/// Render text as a TOML basic string literal
///
/// Parsing the result with [`TomlBackend::parse_literal`] yields a string
/// equal to `text`.
pub fn quote_basic_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn syntax_error(text: &str, err: &toml::de::Error) -> Error {
    let error = Error::parse(err.message().trim_end());
    match err.span() {
        Some(span) => error.with_source_location(SourceLocation::from_offset(text, span.start)),
        None => error,
    }
}

fn convert(value: toml::Value, parse_float: &FloatParser) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => parse_float.parse(&toml::Value::Float(f).to_string())?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::Datetime(dt),
        toml::Value::Array(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| convert(item, parse_float))
                .collect::<Result<Vec<_>>>()?,
        ),
        toml::Value::Table(table) => convert_table(table, parse_float)?,
    })
}

fn convert_table(table: toml::Table, parse_float: &FloatParser) -> Result<Value> {
    let mut map = IndexMap::with_capacity(table.len());
    for (key, value) in table {
        map.insert(key, convert(value, parse_float)?);
    }
    Ok(Value::Mapping(map))
}
