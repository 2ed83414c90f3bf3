use async_trait::async_trait;
use rulebook::{
    BoxError, ErrorMap, FieldConfig, FieldErrors, RegistryEntry, RuleDeclaration, ShouldValidate, Validation, ValidationError,
    Validator, Verdict,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Looks the value up in an in-memory "database" after a short delay
struct UniqueUsername {
    taken: Vec<&'static str>,
}

#[async_trait]
impl Validator for UniqueUsername {
    async fn validate(&self, value: &Value, _param: &Value, _context: &Value) -> Result<Verdict, BoxError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let taken = value.as_str().is_some_and(|name| self.taken.iter().any(|t| *t == name));
        Ok(Verdict::from_bool(!taken).data("username", value.clone()))
    }
}

struct IsBusiness;

#[async_trait]
impl ShouldValidate for IsBusiness {
    async fn should_validate(&self, context: &Value) -> Result<bool, BoxError> {
        tokio::time::sleep(Duration::from_millis(1)).await;
        Ok(context["account_type"] == "business")
    }
}

fn signup_validation() -> Validation {
    let mut address = Validation::new();
    address.set_rules([("street", "required"), ("zip", "required|pattern:\\d{5}")]);

    let config = FieldConfig::builder()
        .stop_on_error_for(["username"])
        .omit_empty_for(["nickname"])
        .should_validate_field("company", IsBusiness)
        .build_with_defaults()
        .expect("Failed to build config");

    let mut validation = Validation::new().with_config(config);
    validation
        .add_validators([(
            "unique",
            RegistryEntry::new(UniqueUsername { taken: vec!["admin", "root"] }, "{username} is already taken."),
        )])
        .set_rules([
            ("username", RuleDeclaration::from("required|min:3|unique")),
            ("email", RuleDeclaration::from("required|email")),
            ("nickname", RuleDeclaration::from("min:2")),
            ("company", RuleDeclaration::from("required")),
            ("address", RuleDeclaration::from(address)),
        ]);
    validation
}

#[tokio::test]
async fn valid_signup_resolves_with_empty_lists() {
    let validation = signup_validation();
    let data = json!({
        "username": "ferris",
        "email": "ferris@example.com",
        "nickname": "",
        "account_type": "personal",
        "address": {"street": "Main St", "zip": "12345"}
    });

    let errors = validation.validate(&data, None).await.unwrap();
    let fields: Vec<&str> = errors.fields().collect();
    assert_eq!(fields, vec!["address", "company", "email", "nickname", "username"]);
    assert!(!errors.has_errors());
}

#[tokio::test]
async fn invalid_signup_reports_every_field() {
    let validation = signup_validation();
    let data = json!({
        "username": "admin",
        "email": "not-an-email",
        "nickname": "x",
        "account_type": "business",
        "address": {"street": "", "zip": "123"}
    });

    let err = validation.validate(&data, None).await.unwrap_err();
    let errors = err.into_errors().expect("validation failure");

    let username = errors.entries("username").unwrap();
    assert_eq!(username.len(), 1);
    assert_eq!(username[0].render(), "admin is already taken.");

    assert_eq!(errors.entries("email").unwrap().len(), 1);
    assert_eq!(errors.entries("nickname").unwrap()[0].additional_data["min"], json!(2));
    assert_eq!(errors.entries("company").unwrap()[0].err_msg, "This field is required.");

    let address = errors.get("address").and_then(FieldErrors::nested).unwrap();
    assert_eq!(address.failed_fields(), 2);
    assert_eq!(errors.failed_fields(), 5);
}

#[tokio::test]
async fn stop_on_error_halts_before_async_lookup() {
    let validation = signup_validation();
    let data = json!({
        "username": "ad",
        "email": "ferris@example.com",
        "address": {"street": "Main", "zip": "12345"}
    });

    let errors = validation.validate(&data, None).await.unwrap_err().into_errors().unwrap();
    let username = errors.entries("username").unwrap();
    assert_eq!(username.len(), 1);
    assert_eq!(username[0].additional_data["min"], json!(3));
}

#[tokio::test]
async fn listeners_see_each_completed_run_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None::<ErrorMap>));

    let mut validation = signup_validation();
    let counter = runs.clone();
    let slot = last.clone();
    validation
        .add_result_listener(move |_: &ErrorMap| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .add_result_listener(move |errors: &ErrorMap| {
            *slot.lock().unwrap() = Some(errors.clone());
        });

    let data = json!({"username": "ferris", "email": "nope", "address": {"street": "a", "zip": "12345"}});
    let err = validation.validate(&data, None).await.unwrap_err();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(last.lock().unwrap().as_ref(), err.errors());

    validation.set_rules([("username", "bogus")]);
    let err = validation.validate(&data, None).await.unwrap_err();
    assert!(matches!(err, ValidationError::UnknownValidator { .. }));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fields_are_validated_concurrently() {
    struct Slow;

    #[async_trait]
    impl Validator for Slow {
        async fn validate(&self, _: &Value, _: &Value, _: &Value) -> Result<Verdict, BoxError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Verdict::valid())
        }
    }

    let mut validation = Validation::new();
    validation
        .add_validator("slow", Slow, "slow")
        .set_rules((0..10).map(|i| (format!("field_{}", i), "slow")));

    let started = tokio::time::Instant::now();
    let errors = tokio::time::timeout(Duration::from_secs(5), validation.validate(&json!({}), None))
        .await
        .expect("validation timed out")
        .unwrap();

    assert_eq!(errors.len(), 10);
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn fatal_and_invalid_outcomes_are_distinguishable() {
    let mut validation = Validation::new();
    validation.set_rules([("name", "required")]);

    match validation.validate(&json!({}), None).await {
        Err(ValidationError::Invalid(errors)) => assert!(errors.has_errors()),
        other => panic!("expected invalid outcome, got {:?}", other),
    }

    validation.set_rules([("name", "required|missing")]);
    match validation.validate(&json!({"name": "x"}), None).await {
        Err(err) => assert!(err.is_fatal()),
        Ok(errors) => panic!("expected fatal error, got {:?}", errors),
    }
}

#[test]
fn predicates_can_be_shared_between_engines() {
    let predicate: Arc<dyn ShouldValidate> = Arc::new(IsBusiness);

    let mut first = Validation::new();
    first.set_should_validate([("company", predicate.clone())]);
    let mut second = Validation::new();
    second.set_should_validate([("vat", predicate)]);

    assert!(first.config().predicate("company").is_some());
    assert!(second.config().predicate("vat").is_some());
    assert!(first.config().predicate("vat").is_none());
}
