//! Origin request normalization.
//!
//! Callers describe the desired access origins either as one pattern plus a
//! value, or as a mapping of pattern to value. Values are `false` (remove),
//! `true` (declare with no extra attributes) or a table of extra attributes.
//! Both forms normalize to an [`OriginRequest`].

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use cordova_config::ORIGIN_ATTRIBUTE;

/// Errors raised while normalizing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("origin pattern must not be empty")]
    EmptyPattern,

    #[error("attribute 'origin' is reserved (pattern {0})")]
    ReservedAttribute(String),

    #[error("invalid attribute name '{name}' for origin {pattern}")]
    InvalidAttributeName { pattern: String, name: String },

    #[error("invalid attribute syntax '{0}' (expected KEY=VALUE)")]
    InvalidAttributeSyntax(String),
}

/// Desired state of one origin pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginValue {
    /// Remove the entry if present.
    Remove,
    /// Declare the entry with no extra attributes.
    AddDefault,
    /// Declare the entry with exactly these extra attributes.
    AddWithAttributes(BTreeMap<String, String>),
}

impl OriginValue {
    /// Build a value from an attribute map. An empty map means [`OriginValue::AddDefault`].
    pub fn with_attributes(attributes: BTreeMap<String, String>) -> Self {
        if attributes.is_empty() {
            OriginValue::AddDefault
        } else {
            OriginValue::AddWithAttributes(attributes)
        }
    }

    /// Extra attributes to declare, or `None` for a removal.
    pub fn attributes(&self) -> Option<BTreeMap<String, String>> {
        match self {
            OriginValue::Remove => None,
            OriginValue::AddDefault => Some(BTreeMap::new()),
            OriginValue::AddWithAttributes(attributes) => Some(attributes.clone()),
        }
    }
}

impl From<bool> for OriginValue {
    fn from(flag: bool) -> Self {
        if flag {
            OriginValue::AddDefault
        } else {
            OriginValue::Remove
        }
    }
}

impl From<BTreeMap<String, String>> for OriginValue {
    fn from(attributes: BTreeMap<String, String>) -> Self {
        OriginValue::with_attributes(attributes)
    }
}

/// Wire shape of a value: a flag or a table of string attributes.
#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum RawOriginValue {
    Flag(bool),
    Attributes(BTreeMap<String, String>),
}

impl<'de> Deserialize<'de> for OriginValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawOriginValue::deserialize(deserializer) {
            Ok(RawOriginValue::Flag(flag)) => Ok(flag.into()),
            Ok(RawOriginValue::Attributes(attributes)) => Ok(attributes.into()),
            Err(_) => Err(serde::de::Error::custom(
                "origin value must be true, false or a table of string attributes",
            )),
        }
    }
}

impl Serialize for OriginValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OriginValue::Remove => RawOriginValue::Flag(false).serialize(serializer),
            OriginValue::AddDefault => RawOriginValue::Flag(true).serialize(serializer),
            OriginValue::AddWithAttributes(attributes) => {
                RawOriginValue::Attributes(attributes.clone()).serialize(serializer)
            }
        }
    }
}

/// Ordered mapping of origin pattern to desired state.
///
/// Iteration follows first insertion; inserting an existing pattern again
/// keeps its position and replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OriginRequest {
    entries: IndexMap<String, OriginValue>,
}

impl OriginRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-pattern form: `("*", false)`, `("tel:*", attrs)`.
    pub fn single(
        pattern: impl Into<String>,
        value: impl Into<OriginValue>,
    ) -> Result<Self, RequestError> {
        let mut request = Self::new();
        request.insert(pattern, value)?;
        Ok(request)
    }

    /// Mapping form.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OriginValue>,
    {
        let mut request = Self::new();
        for (pattern, value) in entries {
            request.insert(pattern, value)?;
        }
        Ok(request)
    }

    /// Add or replace one pattern after validating it.
    pub fn insert(
        &mut self,
        pattern: impl Into<String>,
        value: impl Into<OriginValue>,
    ) -> Result<(), RequestError> {
        let pattern = pattern.into();
        let value = value.into();
        validate_entry(&pattern, &value)?;
        self.entries.insert(pattern, value);
        Ok(())
    }

    pub fn get(&self, pattern: &str) -> Option<&OriginValue> {
        self.entries.get(pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OriginValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for OriginRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = IndexMap::<String, OriginValue>::deserialize(deserializer)?;
        OriginRequest::from_entries(entries).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for OriginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(pattern, value)| match value {
                OriginValue::Remove => format!("-{}", pattern),
                OriginValue::AddDefault => format!("+{}", pattern),
                OriginValue::AddWithAttributes(attributes) => {
                    format!("+{} ({} attribute(s))", pattern, attributes.len())
                }
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Parse a `KEY=VALUE` attribute argument.
pub fn parse_attribute(arg: &str) -> Result<(String, String), RequestError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(RequestError::InvalidAttributeSyntax(arg.to_string())),
    }
}

fn validate_entry(pattern: &str, value: &OriginValue) -> Result<(), RequestError> {
    if pattern.trim().is_empty() {
        return Err(RequestError::EmptyPattern);
    }

    if let OriginValue::AddWithAttributes(attributes) = value {
        for name in attributes.keys() {
            if name == ORIGIN_ATTRIBUTE {
                return Err(RequestError::ReservedAttribute(pattern.to_string()));
            }
            if !is_xml_name(name) {
                return Err(RequestError::InvalidAttributeName {
                    pattern: pattern.to_string(),
                    name: name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Conservative XML name check: letter/underscore/colon start, then
/// letters, digits, `-`, `_`, `.`, `:`.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
