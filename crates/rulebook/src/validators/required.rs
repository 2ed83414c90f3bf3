//! Required field validator

use crate::error::BoxError;
use crate::traits::{Validator, Verdict};
use async_trait::async_trait;
use serde_json::Value;

/// Validator that ensures a field is present and not empty
#[derive(Debug, Clone, Default)]
pub struct RequiredValidator;

impl RequiredValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check if a value is considered empty
    fn is_empty(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(arr) => arr.is_empty(),
            Value::Object(obj) => obj.is_empty(),
            _ => false,
        }
    }
}

#[async_trait]
impl Validator for RequiredValidator {
    async fn validate(&self, value: &Value, _param: &Value, _context: &Value) -> Result<Verdict, BoxError> {
        Ok(Verdict::from_bool(!Self::is_empty(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn check(value: Value) -> bool {
        RequiredValidator::new()
            .validate(&value, &Value::Null, &Value::Null)
            .await
            .unwrap()
            .is_valid
    }

    #[tokio::test]
    async fn test_required_rejects_empty_values() {
        assert!(!check(Value::Null).await);
        assert!(!check(json!("")).await);
        assert!(!check(json!("   ")).await);
        assert!(!check(json!([])).await);
        assert!(!check(json!({})).await);
    }

    #[tokio::test]
    async fn test_required_accepts_present_values() {
        assert!(check(json!("hello")).await);
        assert!(check(json!(0)).await);
        assert!(check(json!(false)).await);
        assert!(check(json!([1])).await);
        assert!(check(json!({"a": 1})).await);
    }
}
