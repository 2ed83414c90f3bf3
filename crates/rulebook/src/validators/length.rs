//! Length-based validators for strings and arrays

use crate::error::BoxError;
use crate::traits::{Validator, Verdict};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn key(self) -> &'static str {
        match self {
            Bound::Min => "min",
            Bound::Max => "max",
        }
    }
}

/// Validator for a minimum or maximum length.
///
/// The limit comes from the rule parameter (`max:3`). A limit given at
/// construction is used when the rule carries no parameter. The limit is
/// reported back in `additional_data` under `min` or `max`.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    bound: Bound,
    fallback: Option<usize>,
}

impl LengthValidator {
    /// Fail when the value is longer than the limit
    pub fn max() -> Self {
        Self {
            bound: Bound::Max,
            fallback: None,
        }
    }

    /// Fail when the value is shorter than the limit
    pub fn min() -> Self {
        Self {
            bound: Bound::Min,
            fallback: None,
        }
    }

    /// Use this limit when the rule has no parameter
    pub fn limit(mut self, limit: usize) -> Self {
        self.fallback = Some(limit);
        self
    }

    /// Get the length of a value (supports strings and arrays)
    fn get_length(value: &Value) -> Option<usize> {
        match value {
            Value::String(s) => Some(s.chars().count()), // Unicode-aware length
            Value::Array(arr) => Some(arr.len()),
            _ => None,
        }
    }

    fn resolve_limit(&self, param: &Value) -> Result<usize, BoxError> {
        match param {
            Value::Null => self
                .fallback
                .ok_or_else(|| format!("`{}` requires a length parameter", self.bound.key()).into()),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| format!("`{}` expects a non-negative integer, got {}", self.bound.key(), n).into()),
            Value::String(s) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("`{}` expects a non-negative integer, got {:?}", self.bound.key(), s).into()),
            other => Err(format!("`{}` expects a non-negative integer, got {}", self.bound.key(), other).into()),
        }
    }
}

#[async_trait]
impl Validator for LengthValidator {
    async fn validate(&self, value: &Value, param: &Value, _context: &Value) -> Result<Verdict, BoxError> {
        let limit = self.resolve_limit(param)?;

        // Skip validation for null values (use `required` for null checks)
        let is_valid = if value.is_null() {
            true
        } else {
            match Self::get_length(value) {
                Some(length) => match self.bound {
                    Bound::Min => length >= limit,
                    Bound::Max => length <= limit,
                },
                None => false,
            }
        };

        Ok(Verdict::from_bool(is_valid).data(self.bound.key(), limit))
    }
}
