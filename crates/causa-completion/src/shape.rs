//! Top-level structural contracts for parsed completions.
//!
//! An [`ExpectedShape`] lists keys that must be present on the top-level JSON
//! object and the kind of value each must hold. Nested values are not
//! inspected: a `results` array of malformed elements still satisfies
//! `{results: array}`.

use serde_json::{Map, Value};
use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// The kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    /// Matches any value, including `null`; only presence is checked.
    Any,
}

impl ValueKind {
    /// Returns the concrete kind of a value. Never returns [`ValueKind::Any`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns `true` if `value` satisfies this kind.
    pub fn matches(self, value: &Value) -> bool {
        self == Self::Any || self == Self::of(value)
    }
}

/// A required top-level key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredKey {
    pub key: String,
    pub kind: ValueKind,
}

/// Why a parsed value does not satisfy an [`ExpectedShape`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    #[error("structure mismatch: expected a top-level object, found {found}")]
    NotAnObject { found: ValueKind },

    #[error("structure mismatch: missing required key '{key}'")]
    MissingKey { key: String },

    #[error("structure mismatch: key '{key}' should be {expected}, found {found}")]
    WrongKind {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// Declarative top-level contract for a structured completion.
///
/// # Example
///
/// ```rust
/// use causa_completion::{ExpectedShape, ValueKind};
/// use serde_json::json;
///
/// let shape = ExpectedShape::new().require("results", ValueKind::Array);
/// assert!(shape.validate(&json!({"results": []})).is_ok());
/// assert!(shape.validate(&json!({"unexpected": 1})).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct ExpectedShape {
    required: Vec<RequiredKey>,
}

impl ExpectedShape {
    /// Creates a shape that accepts any top-level object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a shape with a single required array key.
    pub fn array(key: impl Into<String>) -> Self {
        Self::new().require(key, ValueKind::Array)
    }

    /// Adds a required key of the given kind.
    pub fn require(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        let key = key.into();
        self.required.retain(|existing| existing.key != key);
        self.required.push(RequiredKey { key, kind });
        self
    }

    /// Returns the required keys in declaration order.
    pub fn required(&self) -> &[RequiredKey] {
        &self.required
    }

    /// Checks `value` against this shape.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeMismatch`] found, in declaration order.
    pub fn validate(&self, value: &Value) -> Result<(), ShapeMismatch> {
        let object = value.as_object().ok_or(ShapeMismatch::NotAnObject {
            found: ValueKind::of(value),
        })?;

        self.required
            .iter()
            .try_for_each(|required| Self::check_key(object, required))
    }

    fn check_key(object: &Map<String, Value>, required: &RequiredKey) -> Result<(), ShapeMismatch> {
        let value = object
            .get(&required.key)
            .ok_or_else(|| ShapeMismatch::MissingKey {
                key: required.key.clone(),
            })?;

        if required.kind.matches(value) {
            Ok(())
        } else {
            Err(ShapeMismatch::WrongKind {
                key: required.key.clone(),
                expected: required.kind,
                found: ValueKind::of(value),
            })
        }
    }
}
