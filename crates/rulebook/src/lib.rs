//! # rulebook
//!
//! Declarative, asynchronous data validation. Describe each field of an
//! object with a compact rule such as `"required|max:50"` (or a nested
//! engine for object-valued fields), plug in validator units by name, and
//! get back one error list per field.
//!
//! Fields are validated concurrently; validators within a field run in
//! order. A run resolves to `Ok(ErrorMap)` when every field passed and to
//! `Err(ValidationError::Invalid(ErrorMap))` when any field failed. Any other
//! error variant means the run was aborted (unknown validator, a failing
//! collaborator).

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod rules;
pub mod traits;
pub mod validators;

// Re-exports for easy access
pub use config::{FieldConfig, FieldConfigBuilder, Overrides};
pub use engine::{is_falsy, Validation};
pub use error::{AdditionalData, BoxError, ErrorEntry, ErrorMap, FieldErrors, ValidationError, ValidationResult};
pub use registry::{Registry, RegistryEntry};
pub use rules::{
    NormalizedRule, NormalizedRules, PipeRuleParser, RuleDeclaration, RuleParser, RuleSet, ValidatorParams,
};
pub use traits::{ResultListener, ShouldValidate, Validator, Verdict};

// Built-in validators
pub use validators::{
    CustomValidator, EmailValidator, LengthValidator, NumericValidator, PatternValidator, RequiredValidator,
};
