//! The validation engine: configuration surface and the asynchronous run

use crate::config::{FieldConfig, Overrides};
use crate::error::{ErrorEntry, FieldErrors, ErrorMap, ValidationError, ValidationResult};
use crate::registry::{Registry, RegistryEntry};
use crate::rules::{NormalizedRule, PipeRuleParser, RuleDeclaration, RuleParser, RuleSet, ValidatorParams};
use crate::traits::{ResultListener, ShouldValidate, Validator};
use futures::future::{try_join_all, BoxFuture};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

static MISSING: Value = Value::Null;

/// Falsy in the loose sense used by `omit_empty`: null, `false`, zero and `""`.
/// Empty arrays and objects are not falsy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Declarative validation engine.
///
/// Configure it with the chained `&mut self` methods, then call
/// [`validate`](Self::validate) as often as needed. Each run builds its own
/// error map, so runs never interfere with each other.
///
/// ```rust,ignore
/// let mut validation = Validation::new();
/// validation
///     .set_rules([("name", "required|max:3")])
///     .add_result_listener(|errors: &ErrorMap| println!("{}", errors));
///
/// match validation.validate(&json!({"name": "abcdef"}), None).await {
///     Ok(_) => println!("valid"),
///     Err(ValidationError::Invalid(errors)) => println!("{}", errors),
///     Err(fatal) => return Err(fatal.into()),
/// }
/// ```
#[derive(Clone)]
pub struct Validation {
    registry: Registry,
    config: FieldConfig,
    rules: RuleSet,
    listeners: Vec<Arc<dyn ResultListener>>,
    parser: Arc<dyn RuleParser>,
}

impl Validation {
    /// Engine with the built-in validators and the `|`-separated rule parser
    pub fn new() -> Self {
        Self {
            registry: Registry::with_defaults(),
            config: FieldConfig::default(),
            rules: RuleSet::new(),
            listeners: Vec::new(),
            parser: Arc::new(PipeRuleParser::new()),
        }
    }

    /// Replace the rule parser
    pub fn with_parser(mut self, parser: impl RuleParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Replace the whole registry, e.g. to start without the built-in validators
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the whole field configuration
    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Register validators, replacing any with the same name
    pub fn add_validators<I, K>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, RegistryEntry)>,
        K: Into<String>,
    {
        self.registry.add_validators(validators);
        self
    }

    /// Register a single validator unit
    pub fn add_validator(
        &mut self,
        name: impl Into<String>,
        validator: impl Validator + 'static,
        err_msg: impl Into<String>,
    ) -> &mut Self {
        self.registry.register(name, validator, err_msg);
        self
    }

    /// Replace all should-validate predicates
    pub fn set_should_validate<I, K>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Arc<dyn ShouldValidate>)>,
        K: Into<String>,
    {
        self.config.replace_should_validate(
            predicates
                .into_iter()
                .map(|(field, predicate)| (field.into(), predicate))
                .collect(),
        );
        self
    }

    /// Replace all stop-on-error flags
    pub fn set_stop_on_error<I, K>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        self.config.replace_stop_on_error(collect_flags(flags));
        self
    }

    /// Replace all omit-empty flags
    pub fn set_omit_empty<I, K>(&mut self, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        self.config.replace_omit_empty(collect_flags(flags));
        self
    }

    /// Override default messages of registered validators.
    ///
    /// Fails with [`ValidationError::UnknownMessageTarget`] if a name is not
    /// registered; nothing is changed in that case.
    pub fn set_messages<I, K, V>(&mut self, messages: I) -> ValidationResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.registry.override_messages(messages)?;
        Ok(self)
    }

    /// Replace all rule declarations
    pub fn set_rules<I, K, R>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleDeclaration>,
    {
        self.rules = rules
            .into_iter()
            .map(|(field, rule)| (field.into(), rule.into()))
            .collect();
        self
    }

    /// Append a listener notified after every completed run
    pub fn add_result_listener(&mut self, listener: impl ResultListener + 'static) -> &mut Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Merge declarative overrides into the current configuration
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> ValidationResult<&mut Self> {
        self.registry.override_messages(overrides.messages.clone())?;
        self.config.merge_overrides(overrides);
        Ok(self)
    }

    /// Validate `data` against the configured rules.
    ///
    /// `context` is handed to predicates, validators and nested engines; it
    /// defaults to `data`. Resolves to `Ok(errors)` when every field passed,
    /// to `Err(ValidationError::Invalid(errors))` when any field failed, and
    /// to another `Err` variant when the run had to be aborted.
    pub fn validate<'a>(&'a self, data: &'a Value, context: Option<&'a Value>) -> BoxFuture<'a, ValidationResult<ErrorMap>> {
        Box::pin(async move {
            let context = context.unwrap_or(data);
            let parsed = self.parser.parse(&self.rules, &self.config)?;
            debug!(fields = parsed.len(), "validating");

            // try_join_all keeps input order, so results line up with the keys
            let tasks = parsed
                .iter()
                .map(|(field, rule)| self.validate_field(field, rule, data, context));
            let results = try_join_all(tasks).await?;
            let errors: ErrorMap = parsed.keys().cloned().zip(results).collect();

            for listener in &self.listeners {
                listener.on_result(&errors).await;
            }

            debug!(
                failed_fields = errors.failed_fields(),
                total_errors = errors.total_errors(),
                "validation finished"
            );
            errors.into_result()
        })
    }

    async fn validate_field(&self, field: &str, rule: &NormalizedRule, data: &Value, context: &Value) -> ValidationResult<FieldErrors> {
        let value = data.get(field).unwrap_or(&MISSING);

        if self.should_skip(field, value, context).await? {
            trace!(field, "skipped");
            return Ok(FieldErrors::default());
        }

        match rule {
            NormalizedRule::Nested(engine) => match engine.validate(value, Some(context)).await {
                Ok(_) => Ok(FieldErrors::default()),
                Err(ValidationError::Invalid(nested)) => Ok(FieldErrors::Nested(nested)),
                Err(fatal) => Err(fatal),
            },
            NormalizedRule::Validators(params) => self.run_validators(field, params, value, context).await,
        }
    }

    async fn should_skip(&self, field: &str, value: &Value, context: &Value) -> ValidationResult<bool> {
        if let Some(predicate) = self.config.predicate(field) {
            let should_validate = predicate
                .should_validate(context)
                .await
                .map_err(|source| ValidationError::Predicate {
                    field: field.to_string(),
                    source,
                })?;
            if !should_validate {
                return Ok(true);
            }
        }
        Ok(self.config.omits_empty(field) && is_falsy(value))
    }

    async fn run_validators(&self, field: &str, params: &ValidatorParams, value: &Value, context: &Value) -> ValidationResult<FieldErrors> {
        let mut entries = Vec::new();

        for (name, param) in params.iter() {
            if name.is_empty() {
                break;
            }

            let entry = self
                .registry
                .get(name)
                .ok_or_else(|| ValidationError::UnknownValidator {
                    field: field.to_string(),
                    validator: name.to_string(),
                })?;

            let verdict = entry
                .validator
                .validate(value, param, context)
                .await
                .map_err(|source| ValidationError::Validator {
                    field: field.to_string(),
                    validator: name.to_string(),
                    source,
                })?;

            if !verdict.is_valid {
                trace!(field, validator = name, "failed");
                entries.push(ErrorEntry {
                    err_msg: verdict.err_msg.unwrap_or_else(|| entry.err_msg.clone()),
                    additional_data: verdict.additional_data.unwrap_or_default(),
                });
                if self.config.stops_on_error(field) {
                    break;
                }
            }
        }

        Ok(FieldErrors::Entries(entries))
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validation")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("rules", &self.rules)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

fn collect_flags<I, K>(flags: I) -> HashMap<String, bool>
where
    I: IntoIterator<Item = (K, bool)>,
    K: Into<String>,
{
    flags.into_iter().map(|(field, flag)| (field.into(), flag)).collect()
}
