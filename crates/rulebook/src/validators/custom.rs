//! Closure-backed validator units

use crate::error::BoxError;
use crate::traits::{Validator, Verdict};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Type alias for sync validation functions: `(value, param, context)`
pub type SyncValidationFn = Arc<dyn Fn(&Value, &Value, &Value) -> Verdict + Send + Sync>;

/// Validator unit wrapping a user-defined function
#[derive(Clone)]
pub struct CustomValidator {
    /// Name used in logs and debug output
    pub name: String,
    validator: SyncValidationFn,
}

impl CustomValidator {
    pub fn new<F>(name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &Value, &Value) -> Verdict + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            validator: Arc::new(validator),
        }
    }

    /// Validator checking that the value equals another field of the context
    pub fn same_as(name: impl Into<String>) -> Self {
        Self::new(name, |value, param, context| {
            let other = param.as_str().and_then(|field| context.get(field));
            Verdict::from_bool(other == Some(value))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl Validator for CustomValidator {
    async fn validate(&self, value: &Value, param: &Value, context: &Value) -> Result<Verdict, BoxError> {
        Ok((self.validator)(value, param, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_custom_function() {
        let even = CustomValidator::new("even", |value, _, _| {
            Verdict::from_bool(value.as_i64().is_some_and(|n| n % 2 == 0))
        });

        assert!(even.validate(&json!(4), &Value::Null, &Value::Null).await.unwrap().is_valid);
        assert!(!even.validate(&json!(3), &Value::Null, &Value::Null).await.unwrap().is_valid);
        assert_eq!(even.name(), "even");
    }

    #[tokio::test]
    async fn test_same_as_reads_context() {
        let confirmed = CustomValidator::same_as("confirmed");
        let context = json!({"password": "secret", "password_confirmation": "secret"});

        let verdict = confirmed
            .validate(&json!("secret"), &json!("password"), &context)
            .await
            .unwrap();
        assert!(verdict.is_valid);

        let verdict = confirmed
            .validate(&json!("other"), &json!("password"), &context)
            .await
            .unwrap();
        assert!(!verdict.is_valid);
    }
}
