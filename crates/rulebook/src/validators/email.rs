//! Email format validator

use crate::error::BoxError;
use crate::traits::{Validator, Verdict};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

const ASCII_PATTERN: &str =
    r"^[a-zA-Z0-9]([a-zA-Z0-9._%+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$";
const UNICODE_PATTERN: &str = r"^[^\s@.]+[^\s@]*@[^\s@.]+[^\s@]*\.[^\s@]+$";

/// Validator for email address format
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
    /// Allow international domain names
    pub allow_unicode: bool,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow unicode characters in the address
    pub fn allow_unicode(mut self, allow: bool) -> Self {
        self.allow_unicode = allow;
        self
    }

    fn validate_email_format(&self, email: &str) -> Result<bool, regex::Error> {
        let Some((local_part, domain_part)) = email.split_once('@') else {
            return Ok(false);
        };

        // RFC 5321 limits
        if local_part.is_empty() || local_part.len() > 64 {
            return Ok(false);
        }
        if domain_part.is_empty() || domain_part.len() > 255 || domain_part.contains('@') {
            return Ok(false);
        }

        let pattern = if self.allow_unicode {
            UNICODE_PATTERN
        } else {
            ASCII_PATTERN
        };
        Ok(Regex::new(pattern)?.is_match(email))
    }
}

#[async_trait]
impl Validator for EmailValidator {
    async fn validate(&self, value: &Value, _param: &Value, _context: &Value) -> Result<Verdict, BoxError> {
        let is_valid = match value {
            Value::Null => true,
            Value::String(email) => self.validate_email_format(email)?,
            _ => false,
        };
        Ok(Verdict::from_bool(is_valid))
    }
}
