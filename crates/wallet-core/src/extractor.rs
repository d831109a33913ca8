//! Typed access to the loosely-typed mappings found in pass documents.
//!
//! A pass document is a JSON-shaped tree where any field may be missing,
//! null, or hold a value of the wrong shape. [`PassDataExtractor`] wraps one
//! level of that tree and converts fields on demand. It never panics and never
//! mutates the mapping: a field that is absent or cannot be converted simply
//! comes back as `None` from the `get*` family.
//!
//! Callers that need to know *why* a field is missing can use
//! [`PassDataExtractor::lookup`], which keeps absent and malformed apart.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use wallet_core::{Color, PassDataExtractor};
//!
//! let document = json!({
//!     "description": "Train to Lyon",
//!     "voided": "TRUE",
//!     "backgroundColor": "rgb(10, 20, 30)",
//!     "boardingPass": { "transitType": "PKTransitTypeTrain" }
//! });
//! let pass = PassDataExtractor::from_value(&document).unwrap();
//!
//! assert_eq!(pass.get::<String>("description").as_deref(), Some("Train to Lyon"));
//! assert_eq!(pass.get::<bool>("voided"), Some(true));
//! assert_eq!(pass.get::<Color>("backgroundColor"), Some(Color::new(10, 20, 30)));
//!
//! let structure = pass.get_nested("boardingPass").unwrap();
//! assert!(structure.contains_key("transitType"));
//! assert!(pass.get_list::<String>("locations").is_empty());
//! ```

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::color::{BadColor, Color};
use crate::date::Date;

/// Why a present field could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value had the wrong JSON shape for the requested type.
    #[error("Expected {expected}, found {found}")]
    UnexpectedType {
        /// What the conversion needed.
        expected: &'static str,
        /// What the document held.
        found: &'static str,
    },

    /// The value had the right shape but an unusable content.
    #[error("Invalid {target} '{value}'")]
    InvalidValue {
        /// The type being built.
        target: &'static str,
        /// The offending text.
        value: String,
    },

    /// A field the target type cannot do without was missing.
    #[error("Missing required field '{0}'")]
    MissingField(String),

    /// The color text was not understood.
    #[error(transparent)]
    BadColor(#[from] BadColor),

    /// A caller-supplied constructor failed.
    #[error("Constructor failed: {0}")]
    Constructor(String),

    /// One element of a list could not be converted.
    #[error("Item {index} of '{key}': {source}")]
    ListItem {
        /// The list field.
        key: String,
        /// Position of the bad element.
        index: usize,
        /// Why it failed.
        #[source]
        source: Box<ConversionError>,
    },
}

/// Types that can be built from a single document value.
pub trait FromPassValue: Sized {
    /// Convert `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the value cannot represent `Self`.
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Outcome of looking a field up, keeping absent and malformed apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The field was present and converted.
    Present(T),
    /// The key was missing or held `null`.
    Absent,
    /// The field was present but could not be converted.
    Malformed(ConversionError),
}

impl<T> Lookup<T> {
    /// Collapse to an `Option`, treating absent and malformed alike.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Malformed(_) => None,
        }
    }

    /// Returns `true` if the field converted successfully.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns `true` if the field was missing or null.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` if the field was present but unusable.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// Read-only typed view over one level of a pass document.
#[derive(Debug, Clone, Copy)]
pub struct PassDataExtractor<'a> {
    data: &'a Map<String, Value>,
}

impl<'a> PassDataExtractor<'a> {
    /// Wrap a mapping.
    #[must_use]
    pub const fn new(data: &'a Map<String, Value>) -> Self {
        Self { data }
    }

    /// Wrap `value` if it is a mapping.
    #[must_use]
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(Self::new)
    }

    /// Look `key` up and convert it to `T`.
    pub fn lookup<T: FromPassValue>(&self, key: &str) -> Lookup<T> {
        let Some(value) = self.get_raw(key) else {
            return Lookup::Absent;
        };

        match T::from_pass_value(value) {
            Ok(converted) => Lookup::Present(converted),
            Err(err) => {
                tracing::debug!(key, error = %err, "Malformed pass field, treating as absent");
                Lookup::Malformed(err)
            }
        }
    }

    /// Look `key` up and convert it with `constructor`.
    pub fn lookup_with<T, E, F>(&self, key: &str, constructor: F) -> Lookup<T>
    where
        E: fmt::Display,
        F: FnOnce(&'a Value) -> Result<T, E>,
    {
        let Some(value) = self.get_raw(key) else {
            return Lookup::Absent;
        };

        match constructor(value) {
            Ok(converted) => Lookup::Present(converted),
            Err(err) => {
                let reason = err.to_string();
                tracing::debug!(key, %reason, "Malformed pass field, treating as absent");
                Lookup::Malformed(ConversionError::Constructor(reason))
            }
        }
    }

    /// Convert the value under `key` to `T`, or `None` if absent or malformed.
    ///
    /// `bool` follows the document convention: any text whose lower-cased form
    /// starts with `"true"` is `true`, every other text is `false`.
    #[must_use]
    pub fn get<T: FromPassValue>(&self, key: &str) -> Option<T> {
        self.lookup(key).ok()
    }

    /// Convert the value under `key` with `constructor`.
    #[must_use]
    pub fn get_with<T, E, F>(&self, key: &str, constructor: F) -> Option<T>
    where
        E: fmt::Display,
        F: FnOnce(&'a Value) -> Result<T, E>,
    {
        self.lookup_with(key, constructor).ok()
    }

    /// Convert the value under `key`, treating absence as an error.
    ///
    /// Pass constructors use this for the fields they cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::MissingField`] if the key is absent or null,
    /// or the conversion error if the value is malformed.
    pub fn require<T: FromPassValue>(&self, key: &str) -> Result<T, ConversionError> {
        match self.lookup(key) {
            Lookup::Present(value) => Ok(value),
            Lookup::Absent => Err(ConversionError::MissingField(key.to_string())),
            Lookup::Malformed(err) => Err(err),
        }
    }

    /// The untouched value under `key`. `null` counts as absent.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key).filter(|value| !value.is_null())
    }

    /// The mapping under `key`, wrapped in its own extractor.
    #[must_use]
    pub fn get_nested(&self, key: &str) -> Option<Self> {
        self.get_raw(key).and_then(Self::from_value)
    }

    /// Convert every item of the list under `key` to `T`, one output per item.
    ///
    /// Returns an empty list when the key is absent or its value is falsy.
    ///
    /// # Errors
    ///
    /// Stops at the first item that fails and returns
    /// [`ConversionError::ListItem`] naming its index.
    pub fn try_get_list<T: FromPassValue>(&self, key: &str) -> Result<Vec<T>, ConversionError> {
        self.try_get_list_with(key, T::from_pass_value)
    }

    /// Like [`try_get_list`](Self::try_get_list) with a caller-supplied
    /// constructor.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::ListItem`] for the first failing item.
    pub fn try_get_list_with<T, F>(&self, key: &str, mut constructor: F) -> Result<Vec<T>, ConversionError>
    where
        F: FnMut(&'a Value) -> Result<T, ConversionError>,
    {
        self.get_raw_list(key)
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                constructor(item).map_err(|source| ConversionError::ListItem {
                    key: key.to_string(),
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// Filtering variant of [`try_get_list`](Self::try_get_list): items that
    /// fail to convert are skipped, so the output may be shorter than the list.
    #[must_use]
    pub fn get_list<T: FromPassValue>(&self, key: &str) -> Vec<T> {
        self.get_list_with(key, T::from_pass_value)
    }

    /// Filtering list conversion with `constructor`.
    ///
    /// Returns an empty list when the key is absent or its value is falsy
    /// (`null`, `false`, `0`, `""`, `[]`, `{}`). Items that fail to convert are
    /// skipped and logged. Use [`try_get_list_with`](Self::try_get_list_with)
    /// when every item is required.
    pub fn get_list_with<T, E, F>(&self, key: &str, mut constructor: F) -> Vec<T>
    where
        E: fmt::Display,
        F: FnMut(&'a Value) -> Result<T, E>,
    {
        self.get_raw_list(key)
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match constructor(item) {
                Ok(converted) => Some(converted),
                Err(err) => {
                    tracing::warn!(key, index, error = %err, "Skipping malformed list item");
                    None
                }
            })
            .collect()
    }

    /// Like [`get_list_with`](Self::get_list_with), handing `extra` to every
    /// constructor call after the item itself.
    pub fn get_list_with_extra<X, T, E, F>(&self, key: &str, extra: &X, constructor: F) -> Vec<T>
    where
        X: ?Sized,
        E: fmt::Display,
        F: Fn(&'a Value, &X) -> Result<T, E>,
    {
        self.get_list_with(key, |item| constructor(item, extra))
    }

    /// The items of the list under `key`, unconverted.
    #[must_use]
    pub fn get_raw_list(&self, key: &str) -> Vec<&'a Value> {
        match self.get_raw(key) {
            Some(value) if is_falsy(value) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(other) => {
                tracing::warn!(key, found = value_kind(other), "Expected a list, ignoring field");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// The keys of the wrapped mapping.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.data.keys().map(String::as_str)
    }

    /// Returns `true` if `key` is present, even with a `null` value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of entries in the wrapped mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the wrapped mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() < f64::EPSILON),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn unexpected(expected: &'static str, found: &Value) -> ConversionError {
    ConversionError::UnexpectedType {
        expected,
        found: value_kind(found),
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl FromPassValue for Value {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl FromPassValue for String {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(unexpected("a string", other)),
        }
    }
}

impl FromPassValue for bool {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(text) => Ok(text.to_lowercase().starts_with("true")),
            Value::Bool(flag) => Ok(*flag),
            other => Err(unexpected("a boolean", other)),
        }
    }
}

impl FromPassValue for i64 {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Number(number) => number.as_i64().ok_or_else(|| ConversionError::InvalidValue {
                target: "integer",
                value: number.to_string(),
            }),
            Value::String(text) => {
                text.trim()
                    .parse()
                    .map_err(|_| ConversionError::InvalidValue {
                        target: "integer",
                        value: text.clone(),
                    })
            }
            other => Err(unexpected("an integer", other)),
        }
    }
}

impl FromPassValue for f64 {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Number(number) => number.as_f64().ok_or_else(|| ConversionError::InvalidValue {
                target: "number",
                value: number.to_string(),
            }),
            Value::String(text) => {
                text.trim()
                    .parse()
                    .map_err(|_| ConversionError::InvalidValue {
                        target: "number",
                        value: text.clone(),
                    })
            }
            other => Err(unexpected("a number", other)),
        }
    }
}

impl FromPassValue for Date {
    /// Unparseable text becomes the undefined date rather than an error.
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(Self::from_iso_string)
            .ok_or_else(|| unexpected("a date string", value))
    }
}

impl FromPassValue for Color {
    fn from_pass_value(value: &Value) -> Result<Self, ConversionError> {
        let text = value.as_str().ok_or_else(|| unexpected("a color string", value))?;
        Ok(Self::from_css(text)?)
    }
}
