//! Transform parameters
//!
//! Transforms take loosely typed `key=value` parameters, either from a single
//! string (`"twidth=8 theight = 16 name=hero walk"`) or from repeated CLI
//! flags and config tables. Values are auto-cast to int, then float, then
//! left as a string.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Errors raised when reading a parameter
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParamError {
    /// Value exists but has the wrong type
    #[error("invalid value for '{key}': expected {expected}, found '{found}'")]
    Invalid { key: String, expected: &'static str, found: String },
    /// A `key=value` flag without '='
    #[error("malformed parameter '{0}', expected key=value")]
    Malformed(String),
}

/// A single auto-cast parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Cast a raw string: int first, then float, else the trimmed string.
    pub fn auto_cast(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() {
            return ParamValue::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return ParamValue::Float(f);
        }
        ParamValue::Str(raw.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Int(0) => Some(false),
            ParamValue::Int(1) => Some(true),
            ParamValue::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Some(true),
                "false" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&toml::Value> for ParamValue {
    fn from(value: &toml::Value) -> Self {
        match value {
            toml::Value::Integer(i) => ParamValue::Int(*i),
            toml::Value::Float(f) => ParamValue::Float(*f),
            toml::Value::Boolean(b) => ParamValue::Str(b.to_string()),
            toml::Value::String(s) => ParamValue::auto_cast(s),
            toml::Value::Array(items) => ParamValue::Str(
                items
                    .iter()
                    .map(|v| match v {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => ParamValue::Str(other.to_string()),
        }
    }
}

fn key_pattern() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r"(\S+)=").expect("static regex"))
}

fn equals_pattern() -> &'static Regex {
    static EQ: OnceLock<Regex> = OnceLock::new();
    EQ.get_or_init(|| Regex::new(r" *= *").expect("static regex"))
}

/// Named parameters, ordered by key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `key=value key2=value two` string.
    ///
    /// Each `key=` opens a new entry and the value runs up to the whitespace
    /// before the next key, so the last value may contain spaces.
    pub fn parse(input: &str) -> Self {
        let normalized = equals_pattern().replace_all(input, "=");
        let keys: Vec<_> = key_pattern().captures_iter(&normalized).collect();

        let mut params = Params::new();
        for (i, caps) in keys.iter().enumerate() {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else { continue };
            let end = keys
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(normalized.len());
            let value = &normalized[whole.end()..end];
            params.insert(key.as_str(), ParamValue::auto_cast(value));
        }
        params
    }

    /// Parse repeated `key=value` flags; a value is taken verbatim.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, ParamError> {
        let mut params = Params::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) =
                pair.split_once('=').ok_or_else(|| ParamError::Malformed(pair.to_string()))?;
            if key.trim().is_empty() {
                return Err(ParamError::Malformed(pair.to_string()));
            }
            params.insert(key.trim(), ParamValue::auto_cast(value));
        }
        Ok(params)
    }

    /// Build from a TOML table (config `[transforms.<name>]` sections).
    pub fn from_toml(table: &toml::Table) -> Self {
        let mut params = Params::new();
        for (key, value) in table {
            params.insert(key, ParamValue::from(value));
        }
        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.values.insert(key.into(), value);
    }

    /// Insert a string value, auto-cast.
    pub fn set(&mut self, key: impl Into<String>, value: &str) {
        self.insert(key, ParamValue::auto_cast(value));
    }

    /// Copy every entry of `other` over this set.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// This set with `overrides` applied on top.
    pub fn merged(mut self, overrides: &Params) -> Self {
        self.merge(overrides);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn get_i64(&self, key: &str, default: i64) -> Result<i64, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v.as_i64().ok_or_else(|| invalid(key, "an integer", v)),
        }
    }

    pub fn get_u32(&self, key: &str, default: u32) -> Result<u32, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v
                .as_i64()
                .and_then(|i| u32::try_from(i).ok())
                .ok_or_else(|| invalid(key, "a non-negative integer", v)),
        }
    }

    pub fn get_f32(&self, key: &str, default: f32) -> Result<f32, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v.as_f64().map(|f| f as f32).ok_or_else(|| invalid(key, "a number", v)),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| invalid(key, "a boolean", v)),
        }
    }

    /// String form of a value; numbers are formatted back to text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }

    /// Comma-separated list; empty items are dropped.
    pub fn get_list(&self, key: &str) -> Option<Vec<ParamValue>> {
        self.get(key).map(|v| {
            v.to_string()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ParamValue::auto_cast)
                .collect()
        })
    }

    /// Comma-separated list of non-negative integers.
    pub fn get_u32_list(&self, key: &str) -> Result<Option<Vec<u32>>, ParamError> {
        let Some(items) = self.get_list(key) else { return Ok(None) };
        items
            .iter()
            .map(|item| {
                item.as_i64()
                    .and_then(|i| u32::try_from(i).ok())
                    .ok_or_else(|| invalid(key, "a list of non-negative integers", item))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Comma-separated list of numbers.
    pub fn get_f32_list(&self, key: &str) -> Result<Option<Vec<f32>>, ParamError> {
        let Some(items) = self.get_list(key) else { return Ok(None) };
        items
            .iter()
            .map(|item| {
                item.as_f64().map(|f| f as f32).ok_or_else(|| invalid(key, "a list of numbers", item))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn invalid(key: &str, expected: &'static str, found: &ParamValue) -> ParamError {
    ParamError::Invalid { key: key.to_string(), expected, found: found.to_string() }
}
