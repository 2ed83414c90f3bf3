//! Numeric value validator

use crate::error::BoxError;
use crate::traits::{Validator, Verdict};
use async_trait::async_trait;
use serde_json::Value;

/// Validator accepting JSON numbers and strings that parse as numbers
#[derive(Debug, Clone, Default)]
pub struct NumericValidator {
    /// Allow only integers (no decimals)
    pub integer_only: bool,
}

impl NumericValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integer_only(mut self, integer_only: bool) -> Self {
        self.integer_only = integer_only;
        self
    }

    fn extract_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

#[async_trait]
impl Validator for NumericValidator {
    async fn validate(&self, value: &Value, _param: &Value, _context: &Value) -> Result<Verdict, BoxError> {
        if value.is_null() {
            return Ok(Verdict::valid());
        }

        let is_valid = match Self::extract_number(value) {
            Some(n) if self.integer_only => n.fract() == 0.0,
            Some(_) => true,
            None => false,
        };
        Ok(Verdict::from_bool(is_valid))
    }
}
