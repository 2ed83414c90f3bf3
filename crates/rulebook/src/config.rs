//! Per-field engine configuration and declarative overrides

use crate::traits::ShouldValidate;
use serde::{Deserialize, Serialize};
use service_builder::builder;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-field switches consulted on every validation run.
///
/// A field missing from a map is treated as `false` (or "always validate"
/// for `should_validate`). The maps are only reachable through the methods
/// below; `#[builder]` re-emits the struct with private fields.
#[derive(Clone, Default)]
#[builder]
pub struct FieldConfig {
    /// Stop evaluating a field's validators after its first failure
    #[builder(default)]
    stop_on_error: HashMap<String, bool>,

    /// Skip a field entirely when its value is falsy
    #[builder(default)]
    omit_empty: HashMap<String, bool>,

    /// Predicates deciding whether a field is validated at all
    #[builder(default)]
    should_validate: HashMap<String, Arc<dyn ShouldValidate>>,
}

impl FieldConfig {
    pub fn stops_on_error(&self, field: &str) -> bool {
        self.stop_on_error.get(field).copied().unwrap_or(false)
    }

    pub fn omits_empty(&self, field: &str) -> bool {
        self.omit_empty.get(field).copied().unwrap_or(false)
    }

    pub fn predicate(&self, field: &str) -> Option<&Arc<dyn ShouldValidate>> {
        self.should_validate.get(field)
    }

    pub fn stop_on_error_flags(&self) -> &HashMap<String, bool> {
        &self.stop_on_error
    }

    pub fn omit_empty_flags(&self) -> &HashMap<String, bool> {
        &self.omit_empty
    }

    /// Fields gated by a predicate
    pub fn gated_fields(&self) -> impl Iterator<Item = &str> {
        self.should_validate.keys().map(String::as_str)
    }

    /// Replace every stop-on-error flag
    pub fn replace_stop_on_error(&mut self, flags: HashMap<String, bool>) {
        self.stop_on_error = flags;
    }

    /// Replace every omit-empty flag
    pub fn replace_omit_empty(&mut self, flags: HashMap<String, bool>) {
        self.omit_empty = flags;
    }

    /// Replace every should-validate predicate
    pub fn replace_should_validate(&mut self, predicates: HashMap<String, Arc<dyn ShouldValidate>>) {
        self.should_validate = predicates;
    }

    /// Merge flags from `overrides`; fields not named keep their current value
    pub fn merge_overrides(&mut self, overrides: &Overrides) {
        self.stop_on_error
            .extend(overrides.stop_on_error.iter().map(|(k, v)| (k.clone(), *v)));
        self.omit_empty
            .extend(overrides.omit_empty.iter().map(|(k, v)| (k.clone(), *v)));
    }
}

impl std::fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldConfig")
            .field("stop_on_error", &self.stop_on_error)
            .field("omit_empty", &self.omit_empty)
            .field("should_validate_fields", &self.should_validate.keys().collect::<Vec<_>>())
            .finish()
    }
}

// Add convenience methods to the generated builder
impl FieldConfigBuilder {
    /// Stop after the first failure on each of these fields
    pub fn stop_on_error_for<I, K>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut stop_on_error = self.stop_on_error.clone().unwrap_or_default();
        stop_on_error.extend(fields.into_iter().map(|field| (field.into(), true)));
        self.stop_on_error(stop_on_error)
    }

    /// Skip each of these fields when its value is falsy
    pub fn omit_empty_for<I, K>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut omit_empty = self.omit_empty.clone().unwrap_or_default();
        omit_empty.extend(fields.into_iter().map(|field| (field.into(), true)));
        self.omit_empty(omit_empty)
    }

    /// Gate a field behind a predicate
    pub fn should_validate_field(self, field: impl Into<String>, predicate: impl ShouldValidate + 'static) -> Self {
        let mut should_validate = self.should_validate.clone().unwrap_or_default();
        should_validate.insert(field.into(), Arc::new(predicate) as Arc<dyn ShouldValidate>);
        self.should_validate(should_validate)
    }
}

/// Serializable subset of the configuration, e.g. loaded from a JSON file.
///
/// ```json
/// { "stopOnError": { "name": true }, "omitEmpty": { "nickname": true },
///   "messages": { "required": "Please fill in this field" } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Overrides {
    pub stop_on_error: HashMap<String, bool>,
    pub omit_empty: HashMap<String, bool>,
    /// Validator name to replacement default message
    pub messages: HashMap<String, String>,
}

impl Overrides {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.stop_on_error.is_empty() && self.omit_empty.is_empty() && self.messages.is_empty()
    }
}
