//! Pattern-based validator using regular expressions

use crate::error::BoxError;
use crate::traits::{Validator, Verdict};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Validator matching a string against a regular expression.
///
/// The expression comes from the rule parameter (`pattern:^[A-Z]{3}$`), or
/// from the one given at construction when the rule has none. The whole
/// string must match.
#[derive(Debug, Clone, Default)]
pub struct PatternValidator {
    fallback: Option<Regex>,
}

impl PatternValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this expression when the rule has no parameter
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            fallback: Some(regex),
        }
    }

    /// Compile the expression anchored at both ends
    fn resolve_pattern(&self, param: &Value) -> Result<Regex, BoxError> {
        let source = match param {
            Value::String(pattern) => pattern.clone(),
            Value::Null => match self.fallback {
                Some(ref regex) => regex.as_str().to_string(),
                None => return Err("`pattern` requires a regular expression parameter".into()),
            },
            other => other.to_string(),
        };
        Ok(Regex::new(&format!("^(?:{})$", source))?)
    }
}

#[async_trait]
impl Validator for PatternValidator {
    async fn validate(&self, value: &Value, param: &Value, _context: &Value) -> Result<Verdict, BoxError> {
        let pattern = self.resolve_pattern(param)?;
        let is_valid = match value {
            Value::Null => true,
            Value::String(text) => pattern.is_match(text),
            Value::Number(n) => pattern.is_match(&n.to_string()),
            _ => false,
        };
        Ok(Verdict::from_bool(is_valid))
    }
}
