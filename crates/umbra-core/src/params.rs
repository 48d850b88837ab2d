//! Typed, named module parameters.
//!
//! Parameters are set when a module is registered and may be overridden by
//! the module chain in the configuration file. Lookups of unknown names
//! return the [`ParamValue::Empty`] sentinel instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel returned by [`Params::get`] for names that were never set.
static EMPTY: ParamValue = ParamValue::Empty;

/// A single parameter value.
///
/// Deserialized untagged, so YAML scalars map onto the matching variant
/// (`true` -> [`Bool`](Self::Bool), `3` -> [`Int`](Self::Int), and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Free-form text.
    Text(String),
    /// No value. Returned for missing parameters.
    Empty,
}

impl ParamValue {
    /// Whether this is the empty sentinel.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The boolean value, if this is a [`Bool`](Self::Bool).
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer value, if this is an [`Int`](Self::Int).
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The numeric value as a float. Integers are widened.
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// The text value, if this is a [`Text`](Self::Text).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Named parameters of a single module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Create an empty parameter set.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Insert or replace a parameter.
    ///
    /// Setting the same name twice keeps only the latest value; this is how
    /// configuration overrides values given at registration.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a parameter, returning [`ParamValue::Empty`] when unset.
    pub fn get(&self, name: &str) -> &ParamValue {
        self.values.get(name).unwrap_or(&EMPTY)
    }

    /// Whether a parameter with this name has been set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of parameters set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameter has been set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}
