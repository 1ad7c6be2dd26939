//! End-to-end audit flow: validate, repair through a fake provider, and
//! re-validate.

use std::sync::Arc;
use std::time::Duration;

use frostprep_core::{
    validate, AuditOrchestrator, CoreConfig, FakeProvider, Ingredient, Recipe, ResilientInvoker,
    ValidationLimits,
};

fn fast_config() -> CoreConfig {
    CoreConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        rate_limit_interval: Duration::ZERO,
        ..CoreConfig::default()
    }
}

fn stored_recipe() -> Recipe {
    Recipe {
        title: "Hearty Beef Stew".to_string(),
        description: "Tender beef and root vegetables, frozen flat in bags.".to_string(),
        ingredients: vec![Ingredient {
            name: "beef chuck".to_string(),
            amount: "2".to_string(),
            unit: "lbs".to_string(),
        }],
        prep_instructions: vec!["Cube the beef and portion into bags".to_string()],
        prep_time: 25,
        cook_time: 90,
        servings: 6,
        tags: vec!["beef".to_string(), "winter".to_string()],
        storage_time: 90,
        container_suggestions: vec!["gallon freezer bag".to_string()],
        defrost_instructions: vec!["Thaw overnight in the refrigerator".to_string()],
        cooking_instructions: vec!["Simmer on low for 8 hours".to_string()],
        serving_instructions: vec!["Serve over mashed potatoes".to_string()],
        allergen_info: vec!["None".to_string()],
        dietary_info: vec!["High-protein".to_string()],
        season: "winter".to_string(),
        kid_friendly: Some(true),
        quick_meals: Some(false),
        healthy: Some(true),
        ..Recipe::default()
    }
}

#[tokio::test]
async fn audit_repairs_exactly_the_broken_fields() {
    let mut recipe = stored_recipe();
    recipe.title = String::new();
    recipe.prep_time = 0;

    // Validation sees both problems up front.
    let issues = validate(&recipe, &ValidationLimits::default());
    let flagged: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert!(flagged.contains(&"title"));
    assert!(flagged.contains(&"prepTime"));

    let mut fake = FakeProvider::new();
    fake.add_response(r#"missing field: "title""#, r#"{"title": "Hearty Beef Stew"}"#);
    fake.add_response(r#"missing field: "prepTime""#, r#"{"prepTime": 25}"#);

    let config = fast_config();
    let orchestrator = AuditOrchestrator::new(
        Arc::new(fake),
        ResilientInvoker::new(&config),
        config.limits.clone(),
    );

    let result = orchestrator.audit(&recipe).await.unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.missing_fields, vec!["title", "prepTime"]);

    let fixed = result.fixed_recipe.unwrap();
    assert_eq!(fixed.title, "Hearty Beef Stew");
    assert_eq!(fixed.prep_time, 25);

    // Untouched fields survive the pass unchanged.
    assert_eq!(fixed.cook_time, recipe.cook_time);
    assert_eq!(fixed.ingredients, recipe.ingredients);
    assert_eq!(fixed.tags, recipe.tags);

    // The repaired recipe validates clean.
    assert!(validate(&fixed, &ValidationLimits::default()).is_empty());
    assert!(result
        .audit_notes
        .iter()
        .any(|n| n.contains("post-repair validation clean")));
}

#[tokio::test]
async fn audit_of_a_clean_recipe_changes_nothing() {
    let recipe = stored_recipe();

    let config = fast_config();
    let orchestrator = AuditOrchestrator::new(
        Arc::new(FakeProvider::new()),
        ResilientInvoker::new(&config),
        config.limits.clone(),
    );

    let result = orchestrator.audit(&recipe).await.unwrap();
    assert!(result.is_valid);
    assert!(result.missing_fields.is_empty());
    assert!(result.fixed_recipe.is_none());
}

#[tokio::test]
async fn audit_survives_a_provider_that_keeps_failing() {
    let mut recipe = stored_recipe();
    recipe.title = String::new();
    recipe.storage_time = 0;

    // The provider only knows how to fix storageTime.
    let mut fake = FakeProvider::new();
    fake.add_response(r#"missing field: "storageTime""#, r#"{"storageTime": 90}"#);

    let config = fast_config();
    let orchestrator = AuditOrchestrator::new(
        Arc::new(fake),
        ResilientInvoker::new(&config),
        config.limits.clone(),
    );

    let result = orchestrator.audit(&recipe).await.unwrap();
    let fixed = result.fixed_recipe.unwrap();

    assert!(fixed.title.is_empty());
    assert_eq!(fixed.storage_time, 90);
    assert!(result
        .audit_notes
        .iter()
        .any(|n| n.contains("could not repair title")));
    assert!(result.audit_notes.iter().any(|n| n.contains("repaired storageTime")));
}
