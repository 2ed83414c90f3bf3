//! Collaborator traits consumed by the validation engine

use crate::error::{AdditionalData, BoxError, ErrorMap};
use async_trait::async_trait;
use serde_json::Value;

/// Outcome reported by a validator unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub is_valid: bool,
    /// Overrides the registry's default message when set
    pub err_msg: Option<String>,
    pub additional_data: Option<AdditionalData>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn from_bool(is_valid: bool) -> Self {
        Self {
            is_valid,
            ..Self::default()
        }
    }

    /// Override the default error message
    pub fn message(mut self, err_msg: impl Into<String>) -> Self {
        self.err_msg = Some(err_msg.into());
        self
    }

    /// Attach a metadata value to the verdict
    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_data
            .get_or_insert_with(AdditionalData::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A named, pluggable validation capability.
///
/// `param` is whatever the rule parser produced for this validator on this
/// field (`Value::Null` when the rule had no parameter). `context` is the
/// contextual data of the run, which defaults to the validated object itself.
/// Returning `Err` aborts the whole validation run.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, value: &Value, param: &Value, context: &Value) -> Result<Verdict, BoxError>;
}

/// Gate deciding whether a field is validated at all
#[async_trait]
pub trait ShouldValidate: Send + Sync {
    async fn should_validate(&self, context: &Value) -> Result<bool, BoxError>;
}

#[async_trait]
impl<F> ShouldValidate for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    async fn should_validate(&self, context: &Value) -> Result<bool, BoxError> {
        Ok(self(context))
    }
}

/// Consumer notified with the final error map after every completed run
#[async_trait]
pub trait ResultListener: Send + Sync {
    async fn on_result(&self, errors: &ErrorMap);
}

#[async_trait]
impl<F> ResultListener for F
where
    F: Fn(&ErrorMap) + Send + Sync,
{
    async fn on_result(&self, errors: &ErrorMap) {
        self(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_verdict_builders() {
        assert!(Verdict::valid().is_valid);
        assert!(!Verdict::invalid().is_valid);

        let verdict = Verdict::from_bool(false).message("nope").data("max", 3);
        assert_eq!(verdict.err_msg.as_deref(), Some("nope"));
        assert_eq!(
            verdict.additional_data.and_then(|data| data.get("max").cloned()),
            Some(Value::from(3))
        );
    }

    #[tokio::test]
    async fn test_closure_predicate() {
        let predicate = |ctx: &Value| ctx["enabled"].as_bool().unwrap_or(false);
        let enabled = serde_json::json!({"enabled": true});
        let disabled = serde_json::json!({});

        assert!(predicate.should_validate(&enabled).await.unwrap());
        assert!(!predicate.should_validate(&disabled).await.unwrap());
    }

    #[tokio::test]
    async fn test_closure_listener() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let listener = move |_: &ErrorMap| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        listener.on_result(&ErrorMap::new()).await;
        listener.on_result(&ErrorMap::new()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
