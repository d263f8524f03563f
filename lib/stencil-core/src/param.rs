//! Path and query parameter values.
//!
//! Callers hand parameters over loosely typed, either as a bare string or as
//! a `{"value": ..., "skipUrlEncoding": ...}` object, so [`Parameters`] keeps
//! them as JSON values. Each entry is normalized into a [`ParameterValue`]
//! exactly once, when the template or query string is resolved.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

use crate::{Error, ParamLocation, Result};

/// Characters left untouched when encoding a URI component.
///
/// Matches ECMAScript `encodeURIComponent`: ASCII alphanumerics plus
/// `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URI component (path segment or query value).
///
/// ```
/// use stencil_core::encode_component;
///
/// assert_eq!(encode_component("a b&c/d"), "a%20b%26c%2Fd");
/// assert_eq!(encode_component("it's-fine_~"), "it's-fine_~");
/// ```
#[must_use]
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// A normalized parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// A plain value, always percent-encoded.
    Literal(String),
    /// A value with an explicit encoding choice.
    Explicit {
        /// The raw value.
        value: String,
        /// Substitute `value` verbatim when `true`.
        skip_url_encoding: bool,
    },
}

impl ParameterValue {
    /// A plain value that will be percent-encoded.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// A value that is already URL-safe and is substituted as-is.
    #[must_use]
    pub fn verbatim(value: impl Into<String>) -> Self {
        Self::Explicit {
            value: value.into(),
            skip_url_encoding: true,
        }
    }

    /// The value exactly as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(value) | Self::Explicit { value, .. } => value,
        }
    }

    /// The value as it appears in the URL.
    #[must_use]
    pub fn encoded(&self) -> String {
        match self {
            Self::Explicit {
                value,
                skip_url_encoding: true,
            } => value.clone(),
            Self::Literal(value) | Self::Explicit { value, .. } => encode_component(value),
        }
    }

    /// Normalize a loosely typed parameter.
    ///
    /// Strings become [`ParameterValue::Literal`]. Objects must carry a
    /// non-empty `value` (string, number or boolean) and may set
    /// `skipUrlEncoding`; any other key is ignored. Everything else is
    /// rejected.
    pub fn from_json(name: &str, location: ParamLocation, input: &Value) -> Result<Self> {
        match input {
            Value::String(value) => Ok(Self::Literal(value.clone())),
            Value::Object(fields) => {
                let value = match fields.get("value") {
                    Some(value) if is_truthy(value) => value,
                    _ => return Err(Error::missing_parameter_value(name, location)),
                };
                let value = match value {
                    Value::String(value) => value.clone(),
                    scalar @ (Value::Null | Value::Number(_) | Value::Bool(_)) => scalar.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(Error::invalid_parameter_type(name, location));
                    }
                };
                let skip_url_encoding = fields.get("skipUrlEncoding").is_some_and(is_truthy);
                Ok(Self::Explicit {
                    value,
                    skip_url_encoding,
                })
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) => {
                Err(Error::invalid_parameter_type(name, location))
            }
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<ParameterValue> for Value {
    fn from(param: ParameterValue) -> Self {
        match param {
            ParameterValue::Literal(value) => Self::String(value),
            ParameterValue::Explicit {
                value,
                skip_url_encoding,
            } => {
                let mut fields = Map::new();
                fields.insert("value".to_string(), Self::String(value));
                fields.insert(
                    "skipUrlEncoding".to_string(),
                    Self::Bool(skip_url_encoding),
                );
                Self::Object(fields)
            }
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Insertion-ordered mapping of parameter name to loosely typed value.
///
/// Inserting an existing name replaces its value in place.
///
/// ```
/// use stencil_core::{ParameterValue, Parameters};
///
/// let params = Parameters::new()
///     .with("subscriptionId", "abc 123")
///     .with("nextLink", ParameterValue::verbatim("a%2Fb"));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    /// Creates an empty set of parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Inserts or replaces a parameter, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value supplied for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build parameters from any serializable value.
    ///
    /// The value must serialize to a JSON object; its fields become the
    /// parameters, in the object's key order. Numbers and booleans are
    /// rendered as strings, `None` fields serialize to `null` and are later
    /// skipped by the query composer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQueryParameters`] if the value is not a mapping.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(fields
                .into_iter()
                .map(|(name, value)| match value {
                    Value::Number(_) | Value::Bool(_) => (name, Value::String(value.to_string())),
                    other => (name, other),
                })
                .collect()),
            other => Err(Error::InvalidQueryParameters(json_kind(&other).to_string())),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
