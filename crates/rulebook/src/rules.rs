//! Rule declarations, their normalized form, and the rule parser contract

use crate::config::FieldConfig;
use crate::engine::Validation;
use crate::error::ValidationResult;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// What a field is validated with
#[derive(Clone)]
pub enum RuleDeclaration {
    /// Compact textual rule, e.g. `"required|max:3"`; its format belongs to the parser
    Rules(String),
    /// A nested engine validating the field's value as an object of its own
    Nested(Arc<Validation>),
}

impl std::fmt::Debug for RuleDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleDeclaration::Rules(rules) => f.debug_tuple("Rules").field(rules).finish(),
            RuleDeclaration::Nested(_) => f.write_str("Nested(..)"),
        }
    }
}

impl From<&str> for RuleDeclaration {
    fn from(rules: &str) -> Self {
        RuleDeclaration::Rules(rules.to_string())
    }
}

impl From<String> for RuleDeclaration {
    fn from(rules: String) -> Self {
        RuleDeclaration::Rules(rules)
    }
}

impl From<Validation> for RuleDeclaration {
    fn from(engine: Validation) -> Self {
        RuleDeclaration::Nested(Arc::new(engine))
    }
}

impl From<Arc<Validation>> for RuleDeclaration {
    fn from(engine: Arc<Validation>) -> Self {
        RuleDeclaration::Nested(engine)
    }
}

/// Rule declarations keyed by field name
pub type RuleSet = HashMap<String, RuleDeclaration>;

/// Ordered mapping from validator name to its parameter.
///
/// Evaluation follows insertion order. `Value::Null` means "no parameter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorParams {
    entries: Vec<(String, Value)>,
}

impl ValidatorParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a validator's parameter, keeping its original position if already present
    pub fn insert(&mut self, name: impl Into<String>, param: impl Into<Value>) {
        let name = name.into();
        let param = param.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = param,
            None => self.entries.push((name, param)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, param: impl Into<Value>) -> Self {
        self.insert(name, param);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, param)| param)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, param)| (name.as_str(), param))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValidatorParams {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, param) in iter {
            params.insert(name, param);
        }
        params
    }
}

/// Engine-consumable form of one field's rules
#[derive(Clone)]
pub enum NormalizedRule {
    Validators(ValidatorParams),
    Nested(Arc<Validation>),
}

impl std::fmt::Debug for NormalizedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizedRule::Validators(params) => f.debug_tuple("Validators").field(params).finish(),
            NormalizedRule::Nested(_) => f.write_str("Nested(..)"),
        }
    }
}

/// Normalized rules keyed by field name
pub type NormalizedRules = HashMap<String, NormalizedRule>;

/// Turns rule declarations into normalized rules.
///
/// Called once per validation run with the engine's current configuration,
/// so implementations must not cache across calls.
pub trait RuleParser: Send + Sync {
    fn parse(&self, rules: &RuleSet, config: &FieldConfig) -> ValidationResult<NormalizedRules>;
}

impl<F> RuleParser for F
where
    F: Fn(&RuleSet, &FieldConfig) -> ValidationResult<NormalizedRules> + Send + Sync,
{
    fn parse(&self, rules: &RuleSet, config: &FieldConfig) -> ValidationResult<NormalizedRules> {
        self(rules, config)
    }
}

/// Default parser for `|`-separated rules such as `"required|min:2|max:50"`.
///
/// Each segment is `name` or `name:param`, split at the first `:`. A param
/// that reads as a JSON number or boolean becomes one; anything else stays a
/// string, and a missing or empty param becomes `Value::Null`. Empty segments
/// are kept as an empty validator name, which stops evaluation of the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeRuleParser;

impl PipeRuleParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single textual declaration
    pub fn parse_declaration(rules: &str) -> ValidatorParams {
        rules
            .split('|')
            .map(|segment| {
                let segment = segment.trim();
                match segment.split_once(':') {
                    Some((name, param)) => (name.trim().to_string(), Self::parse_param(param)),
                    None => (segment.to_string(), Value::Null),
                }
            })
            .collect()
    }

    fn parse_param(raw: &str) -> Value {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Null;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
            _ => Value::String(raw.to_string()),
        }
    }
}

impl RuleParser for PipeRuleParser {
    fn parse(&self, rules: &RuleSet, _config: &FieldConfig) -> ValidationResult<NormalizedRules> {
        Ok(rules
            .iter()
            .map(|(field, declaration)| {
                let rule = match declaration {
                    RuleDeclaration::Rules(text) => NormalizedRule::Validators(Self::parse_declaration(text)),
                    RuleDeclaration::Nested(engine) => NormalizedRule::Nested(engine.clone()),
                };
                (field.clone(), rule)
            })
            .collect())
    }
}
