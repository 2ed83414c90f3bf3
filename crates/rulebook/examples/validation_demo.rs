//! Validation demo: rules, nested objects, conditional fields and listeners

use rulebook::{
    CustomValidator, ErrorMap, FieldConfig, RuleDeclaration, Validation, ValidationError, Verdict,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rulebook=debug")))
        .init();

    let mut address = Validation::new();
    address.set_rules([("street", "required"), ("zip", "required|pattern:\\d{5}")]);

    let config = FieldConfig::builder()
        .stop_on_error_for(["username"])
        .omit_empty_for(["website"])
        .should_validate_field("company", |ctx: &serde_json::Value| ctx["account_type"] == "business")
        .build_with_defaults()
        .expect("Failed to build config");

    let mut validation = Validation::new().with_config(config);
    validation
        .add_validator(
            "https",
            CustomValidator::new("https", |value, _, _| {
                Verdict::from_bool(value.as_str().is_some_and(|url| url.starts_with("https://")))
            }),
            "This field must be an https URL.",
        )
        .set_messages([("required", "Please fill in this field.")])?
        .set_rules([
            ("username", RuleDeclaration::from("required|min:3|max:20")),
            ("email", RuleDeclaration::from("required|email")),
            ("website", RuleDeclaration::from("https")),
            ("company", RuleDeclaration::from("required")),
            ("address", RuleDeclaration::from(address)),
        ])
        .add_result_listener(|errors: &ErrorMap| {
            println!("listener: {} field(s) failed", errors.failed_fields());
        });

    let inputs = [
        json!({
            "username": "ferris",
            "email": "ferris@example.com",
            "website": "",
            "account_type": "personal",
            "address": {"street": "Main St", "zip": "12345"}
        }),
        json!({
            "username": "fe",
            "email": "nope",
            "website": "http://example.com",
            "account_type": "business",
            "address": {"street": "", "zip": "1234"}
        }),
    ];

    for input in &inputs {
        match validation.validate(input, None).await {
            Ok(_) => println!("✅ valid"),
            Err(ValidationError::Invalid(errors)) => {
                println!("❌ {}", errors);
                println!("{}", serde_json::to_string_pretty(&errors.to_json())?);
            }
            Err(fatal) => return Err(fatal.into()),
        }
    }

    Ok(())
}
