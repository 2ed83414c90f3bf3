//! Validator registry: validator name to unit and default message

use crate::error::{ValidationError, ValidationResult};
use crate::traits::Validator;
use crate::validators::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A registered validator unit with its default error message
#[derive(Clone)]
pub struct RegistryEntry {
    pub validator: Arc<dyn Validator>,
    /// Default message template, used when the unit supplies none
    pub err_msg: String,
}

impl RegistryEntry {
    pub fn new(validator: impl Validator + 'static, err_msg: impl Into<String>) -> Self {
        Self {
            validator: Arc::new(validator),
            err_msg: err_msg.into(),
        }
    }

    pub fn from_arc(validator: Arc<dyn Validator>, err_msg: impl Into<String>) -> Self {
        Self {
            validator,
            err_msg: err_msg.into(),
        }
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("err_msg", &self.err_msg)
            .finish_non_exhaustive()
    }
}

/// Mapping from validator name to [`RegistryEntry`].
///
/// Cloning copies every entry's message, so overriding messages on a clone
/// never affects the original. Units themselves are shared.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in validators
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add_validators([
            ("required", RegistryEntry::new(RequiredValidator::new(), "This field is required.")),
            ("max", RegistryEntry::new(LengthValidator::max(), "This field must not exceed {max} characters.")),
            ("min", RegistryEntry::new(LengthValidator::min(), "This field must be at least {min} characters.")),
            ("email", RegistryEntry::new(EmailValidator::new(), "This field must be a valid email address.")),
            ("pattern", RegistryEntry::new(PatternValidator::new(), "This field has an invalid format.")),
            ("numeric", RegistryEntry::new(NumericValidator::new(), "This field must be a number.")),
        ]);
        registry
    }

    /// Insert or replace entries by name
    pub fn add_validators<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, RegistryEntry)>,
        K: Into<String>,
    {
        for (name, entry) in entries {
            let name = name.into();
            if self.entries.insert(name.clone(), entry).is_some() {
                debug!(validator = %name, "replaced registered validator");
            } else {
                debug!(validator = %name, "registered validator");
            }
        }
    }

    /// Register a single validator unit
    pub fn register(&mut self, name: impl Into<String>, validator: impl Validator + 'static, err_msg: impl Into<String>) {
        self.add_validators([(name.into(), RegistryEntry::new(validator, err_msg))]);
    }

    /// Replace the default messages of already registered validators.
    ///
    /// Fails without changing anything if any name is not registered.
    pub fn override_messages<I, K, V>(&mut self, messages: I) -> ValidationResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let messages: Vec<(String, String)> = messages
            .into_iter()
            .map(|(name, message)| (name.into(), message.into()))
            .collect();

        if let Some((name, _)) = messages.iter().find(|(name, _)| !self.entries.contains_key(name)) {
            return Err(ValidationError::UnknownMessageTarget {
                validator: name.clone(),
            });
        }

        for (name, message) in messages {
            if let Some(entry) = self.entries.get_mut(&name) {
                entry.err_msg = message;
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of all registered validators, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("validators", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Verdict;
    use serde_json::{json, Value};

    #[test]
    fn test_defaults_registered() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.names(), vec!["email", "max", "min", "numeric", "pattern", "required"]);
        assert_eq!(registry.get("required").unwrap().err_msg, "This field is required.");
    }

    #[test]
    fn test_add_validators_overwrites() {
        let mut registry = Registry::with_defaults();
        registry.register("max", CustomValidator::new("never", |_, _, _| Verdict::invalid()), "custom max");

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.get("max").unwrap().err_msg, "custom max");

        let verdict = tokio_test::block_on(registry.get("max").unwrap().validator.validate(
            &json!("a"),
            &json!(10),
            &Value::Null,
        ))
        .unwrap();
        assert!(!verdict.is_valid);
    }

    #[test]
    fn test_override_messages() {
        let mut registry = Registry::with_defaults();
        registry
            .override_messages([("required", "Please fill this in")])
            .unwrap();
        assert_eq!(registry.get("required").unwrap().err_msg, "Please fill this in");
    }

    #[test]
    fn test_override_unknown_message_fails_without_changes() {
        let mut registry = Registry::with_defaults();
        let result = registry.override_messages([("required", "changed"), ("nope", "x")]);

        assert!(matches!(
            result,
            Err(ValidationError::UnknownMessageTarget { ref validator }) if validator == "nope"
        ));
        assert_eq!(registry.get("required").unwrap().err_msg, "This field is required.");
    }

    #[test]
    fn test_clones_are_independent() {
        let original = Registry::with_defaults();
        let mut copy = original.clone();
        copy.override_messages([("email", "bad email")]).unwrap();

        assert_eq!(copy.get("email").unwrap().err_msg, "bad email");
        assert_eq!(
            original.get("email").unwrap().err_msg,
            "This field must be a valid email address."
        );
        assert_eq!(
            Registry::with_defaults().get("email").unwrap().err_msg,
            "This field must be a valid email address."
        );
    }
}
