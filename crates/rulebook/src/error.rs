//! Error entries, the per-field error map, and the engine error type

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Structured metadata attached to a failed validation (e.g. `{"max": 3}`)
pub type AdditionalData = serde_json::Map<String, Value>;

/// Error raised by a collaborator (validator unit, predicate, parser)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A single validation failure for a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    /// Message template, either supplied by the validator or the registry default
    pub err_msg: String,
    /// Metadata reported by the validator, empty when none was supplied
    #[serde(default)]
    pub additional_data: AdditionalData,
}

impl ErrorEntry {
    pub fn new(err_msg: impl Into<String>) -> Self {
        Self {
            err_msg: err_msg.into(),
            additional_data: AdditionalData::new(),
        }
    }

    /// Attach a metadata value
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    /// Substitute `{key}` placeholders in the message with `additional_data` values
    pub fn render(&self) -> String {
        let mut message = self.err_msg.clone();
        for (key, value) in &self.additional_data {
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            message = message.replace(&format!("{{{}}}", key), &replacement);
        }
        message
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Errors collected for one field.
///
/// A field validated by its own validators holds an ordered list of entries.
/// A field delegated to a nested engine holds that engine's whole error map
/// when the nested validation failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldErrors {
    Entries(Vec<ErrorEntry>),
    Nested(ErrorMap),
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldErrors::Entries(entries) => entries.is_empty(),
            FieldErrors::Nested(map) => !map.has_errors(),
        }
    }

    /// Number of entries, counting nested entries recursively
    pub fn len(&self) -> usize {
        match self {
            FieldErrors::Entries(entries) => entries.len(),
            FieldErrors::Nested(map) => map.total_errors(),
        }
    }

    /// Entries of a non-nested field
    pub fn entries(&self) -> Option<&[ErrorEntry]> {
        match self {
            FieldErrors::Entries(entries) => Some(entries),
            FieldErrors::Nested(_) => None,
        }
    }

    /// Error map of a nested field
    pub fn nested(&self) -> Option<&ErrorMap> {
        match self {
            FieldErrors::Nested(map) => Some(map),
            FieldErrors::Entries(_) => None,
        }
    }
}

impl Default for FieldErrors {
    fn default() -> Self {
        FieldErrors::Entries(Vec::new())
    }
}

impl From<Vec<ErrorEntry>> for FieldErrors {
    fn from(entries: Vec<ErrorEntry>) -> Self {
        FieldErrors::Entries(entries)
    }
}

/// Result of a validation run: one entry per validated field.
///
/// Fields without failures are present with an empty list, so the same shape
/// is returned on success and on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ErrorMap {
    fields: BTreeMap<String, FieldErrors>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the errors of a field, replacing whatever was there
    pub fn insert(&mut self, field: impl Into<String>, errors: impl Into<FieldErrors>) {
        self.fields.insert(field.into(), errors.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldErrors> {
        self.fields.get(field)
    }

    /// Entries of a non-nested field
    pub fn entries(&self, field: &str) -> Option<&[ErrorEntry]> {
        self.fields.get(field).and_then(FieldErrors::entries)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// True when the field is present and has no errors
    pub fn is_field_valid(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(FieldErrors::is_empty)
    }

    /// True when at least one field has a non-empty error list
    pub fn has_errors(&self) -> bool {
        self.fields.values().any(|errors| !errors.is_empty())
    }

    /// Number of fields with at least one error
    pub fn failed_fields(&self) -> usize {
        self.fields.values().filter(|errors| !errors.is_empty()).count()
    }

    /// Total number of error entries, counting nested maps recursively
    pub fn total_errors(&self) -> usize {
        self.fields.values().map(FieldErrors::len).sum()
    }

    /// Number of fields, including valid ones
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldErrors)> {
        self.fields.iter().map(|(field, errors)| (field.as_str(), errors))
    }

    /// `Ok(self)` when every field is clean, `Err(ValidationError::Invalid(self))` otherwise
    pub fn into_result(self) -> ValidationResult<ErrorMap> {
        if self.has_errors() {
            Err(ValidationError::Invalid(self))
        } else {
            Ok(self)
        }
    }

    /// Convert to a JSON envelope suitable for API responses
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "fields": self
            }
        })
    }
}

impl FromIterator<(String, FieldErrors)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldErrors)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_errors() {
            return write!(f, "No validation errors");
        }
        write!(f, "Validation failed for {} field(s):", self.failed_fields())?;
        for (field, errors) in &self.fields {
            match errors {
                FieldErrors::Entries(entries) => {
                    for entry in entries {
                        write!(f, "\n  {}: {}", field, entry)?;
                    }
                }
                FieldErrors::Nested(map) if map.has_errors() => {
                    write!(f, "\n  {}: {} nested error(s)", field, map.total_errors())?;
                }
                FieldErrors::Nested(_) => {}
            }
        }
        Ok(())
    }
}

/// Everything `validate` and the configuration surface can fail with.
///
/// `Invalid` is the ordinary "data did not pass" outcome and carries the full
/// error map. Every other variant is fatal: the run was aborted and no error
/// map was produced.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Invalid(ErrorMap),

    #[error("Please provide an existing validator name for `{field}`: `{validator}` doesn't exist")]
    UnknownValidator { field: String, validator: String },

    #[error("Cannot override the message of `{validator}`: no such validator is registered")]
    UnknownMessageTarget { validator: String },

    #[error("Invalid rule declaration for `{field}`: {message}")]
    RuleParse { field: String, message: String },

    #[error("Validator `{validator}` failed on `{field}`: {source}")]
    Validator {
        field: String,
        validator: String,
        #[source]
        source: BoxError,
    },

    #[error("Should-validate predicate failed on `{field}`: {source}")]
    Predicate {
        field: String,
        #[source]
        source: BoxError,
    },
}

impl ValidationError {
    /// True for configuration and collaborator failures, false for `Invalid`
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ValidationError::Invalid(_))
    }

    /// Error map of a failed validation
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            ValidationError::Invalid(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_errors(self) -> Option<ErrorMap> {
        match self {
            ValidationError::Invalid(map) => Some(map),
            _ => None,
        }
    }
}
