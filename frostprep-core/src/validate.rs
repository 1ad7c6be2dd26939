//! Rule-based recipe validation.
//!
//! Rules are pure, order-independent predicates over the recipe; every rule
//! runs on every pass so a single call reports all problems, not just the
//! first. Within one array rule, the first offending element is enough to
//! flag the field once. How to *fix* an issue is the audit orchestrator's
//! concern, not this module's.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ValidationLimits;
use crate::types::{Recipe, ValidationIssue};

/// HTML tags and entities; any match in a text field is a violation.
static HTML_MARKUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>|&[a-zA-Z]+;|&#\d+;").expect("invalid markup regex"));

/// Whether text contains HTML markup (tags or entities).
pub fn contains_html_markup(text: &str) -> bool {
    HTML_MARKUP_REGEX.is_match(text)
}

/// Validate a recipe against every rule, collecting all issues.
///
/// The recipe is valid iff the returned list is empty.
pub fn validate(recipe: &Recipe, limits: &ValidationLimits) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_required_scalars(recipe, &mut issues);
    check_markup(recipe, &mut issues);
    check_description_length(recipe, limits, &mut issues);
    check_arrays(recipe, &mut issues);
    check_numeric_ranges(recipe, limits, &mut issues);

    issues
}

fn check_required_scalars(recipe: &Recipe, issues: &mut Vec<ValidationIssue>) {
    if recipe.title.trim().is_empty() {
        issues.push(ValidationIssue::new("title", "Title is required"));
    }
    if recipe.description.trim().is_empty() {
        issues.push(ValidationIssue::new("description", "Description is required"));
    }
    if recipe.season.trim().is_empty() {
        issues.push(ValidationIssue::new("season", "Season is required"));
    }
    if recipe.original_language.trim().is_empty() {
        issues.push(ValidationIssue::new(
            "originalLanguage",
            "Original language is required",
        ));
    }
}

fn check_markup(recipe: &Recipe, issues: &mut Vec<ValidationIssue>) {
    if contains_html_markup(&recipe.title) {
        issues.push(ValidationIssue::new("title", "Title contains HTML markup"));
    }
    if contains_html_markup(&recipe.description) {
        issues.push(ValidationIssue::new(
            "description",
            "Description contains HTML markup",
        ));
    }

    if recipe.ingredients.iter().any(|ing| {
        contains_html_markup(&ing.name)
            || contains_html_markup(&ing.amount)
            || contains_html_markup(&ing.unit)
    }) {
        issues.push(ValidationIssue::new(
            "ingredients",
            "Ingredients contain HTML markup",
        ));
    }

    let text_lists: [(&str, &str, &[String]); 7] = [
        ("prepInstructions", "Prep instructions", &recipe.prep_instructions),
        ("defrostInstructions", "Defrost instructions", &recipe.defrost_instructions),
        ("cookingInstructions", "Cooking instructions", &recipe.cooking_instructions),
        ("servingInstructions", "Serving instructions", &recipe.serving_instructions),
        ("tags", "Tags", &recipe.tags),
        ("allergenInfo", "Allergen info", &recipe.allergen_info),
        ("dietaryInfo", "Dietary info", &recipe.dietary_info),
    ];
    for (field, label, items) in text_lists {
        if items.iter().any(|item| contains_html_markup(item)) {
            issues.push(ValidationIssue::new(
                field,
                format!("{label} contain HTML markup"),
            ));
        }
    }
}

fn check_description_length(
    recipe: &Recipe,
    limits: &ValidationLimits,
    issues: &mut Vec<ValidationIssue>,
) {
    if recipe.description.chars().count() > limits.description_budget {
        issues.push(ValidationIssue::new(
            "description",
            format!(
                "Description exceeds {} characters",
                limits.description_budget
            ),
        ));
    }
}

fn check_arrays(recipe: &Recipe, issues: &mut Vec<ValidationIssue>) {
    if recipe.ingredients.is_empty() {
        issues.push(ValidationIssue::new(
            "ingredients",
            "Ingredients array is empty",
        ));
    } else if recipe.ingredients.iter().any(|ing| !ing.is_complete()) {
        issues.push(ValidationIssue::new(
            "ingredients",
            "Invalid ingredient format",
        ));
    }

    let string_arrays: [(&str, &str, &[String]); 7] = [
        ("prepInstructions", "Prep instructions", &recipe.prep_instructions),
        ("defrostInstructions", "Defrost instructions", &recipe.defrost_instructions),
        ("cookingInstructions", "Cooking instructions", &recipe.cooking_instructions),
        ("servingInstructions", "Serving instructions", &recipe.serving_instructions),
        ("tags", "Tags", &recipe.tags),
        ("allergenInfo", "Allergen info", &recipe.allergen_info),
        ("dietaryInfo", "Dietary info", &recipe.dietary_info),
    ];
    for (field, label, items) in string_arrays {
        if items.is_empty() {
            issues.push(ValidationIssue::new(
                field,
                format!("{label} array is empty"),
            ));
        } else if items.iter().any(|item| item.trim().is_empty()) {
            issues.push(ValidationIssue::new(
                field,
                format!("Invalid {} format", label.to_lowercase()),
            ));
        }
    }
}

fn check_numeric_ranges(
    recipe: &Recipe,
    limits: &ValidationLimits,
    issues: &mut Vec<ValidationIssue>,
) {
    let ranges = [
        ("prepTime", "Prep time", recipe.prep_time, &limits.prep_time, "minutes"),
        ("cookTime", "Cook time", recipe.cook_time, &limits.cook_time, "minutes"),
        ("servings", "Servings", recipe.servings, &limits.servings, ""),
        ("storageTime", "Storage time", recipe.storage_time, &limits.storage_time, "days"),
    ];
    for (field, label, value, range, unit) in ranges {
        if !range.contains(&value) {
            let suffix = if unit.is_empty() {
                String::new()
            } else {
                format!(" {unit}")
            };
            issues.push(ValidationIssue::new(
                field,
                format!(
                    "{label} must be between {} and {}{suffix}",
                    range.start(),
                    range.end()
                ),
            ));
        }
    }
}
