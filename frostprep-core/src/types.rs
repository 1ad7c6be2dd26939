//! Core recipe types shared across generation, validation, and repair.

use serde::{Deserialize, Deserializer, Serialize};

/// A single recipe ingredient with free-text amount and unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

impl Ingredient {
    /// An ingredient is well-formed when all three parts are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.amount.trim().is_empty()
            && !self.unit.trim().is_empty()
    }
}

/// A freezer-prep recipe as produced by the generative service.
///
/// Every field is defaulted so a partial or malformed reply still
/// deserializes; missing data shows up as empty strings, empty arrays,
/// or zero values, which the validation rules then flag.
///
/// Wire format is camelCase to match the generation prompt's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub prep_instructions: Vec<String>,
    #[serde(deserialize_with = "de_minutes")]
    pub prep_time: u32,
    #[serde(deserialize_with = "de_minutes")]
    pub cook_time: u32,
    #[serde(deserialize_with = "de_count")]
    pub servings: u32,
    pub tags: Vec<String>,
    /// Freezer storage time in days.
    #[serde(deserialize_with = "de_days")]
    pub storage_time: u32,
    pub container_suggestions: Vec<String>,
    pub defrost_instructions: Vec<String>,
    pub cooking_instructions: Vec<String>,
    pub serving_instructions: Vec<String>,
    pub allergen_info: Vec<String>,
    pub dietary_info: Vec<String>,
    pub season: String,
    pub original_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid_friendly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_meals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
}

impl Default for Recipe {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            ingredients: Vec::new(),
            prep_instructions: Vec::new(),
            prep_time: 0,
            cook_time: 0,
            servings: 0,
            tags: Vec::new(),
            storage_time: 0,
            container_suggestions: Vec::new(),
            defrost_instructions: Vec::new(),
            cooking_instructions: Vec::new(),
            serving_instructions: Vec::new(),
            allergen_info: Vec::new(),
            dietary_info: Vec::new(),
            season: String::new(),
            original_language: "en".to_string(),
            kid_friendly: None,
            quick_meals: None,
            healthy: None,
        }
    }
}

/// Input for generating a new recipe. Constructed once per call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Season tag, e.g. "winter".
    pub season: String,
    /// Optional target recipe name.
    pub recipe_name: Option<String>,
    /// Ingredients the recipe must include.
    pub ingredients: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub cuisine: Option<String>,
    pub servings: Option<u32>,
}

impl GenerationRequest {
    pub fn for_season(season: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            ..Default::default()
        }
    }
}

/// One validation finding. A recipe is valid iff its issue list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Wire name of the offending field, e.g. "prepTime".
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one audit/repair pass. Immutable after return; the caller
/// decides whether to persist `fixed_recipe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub is_valid: bool,
    /// Wire names of fields found missing or structurally invalid.
    pub missing_fields: Vec<String>,
    /// Present only when a repair pass was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_recipe: Option<Recipe>,
    /// Human-readable trail of what was checked and fixed.
    pub audit_notes: Vec<String>,
}

/// Lenient deserializer accepting either a JSON number or a string
/// like "45 minutes" or "2 hours". Unparseable strings fall back to 30,
/// matching the original service's behavior.
fn de_minutes<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let raw = NumberOrString::deserialize(de)?;
    Ok(match raw {
        NumberOrString::Number(n) => n.max(0.0).round() as u32,
        NumberOrString::String(s) => parse_scaled(&s, &[("hour", 60), ("hr", 60)], 30),
    })
}

/// Like [`de_minutes`] but for day counts: "3 weeks" and "2 months" scale.
fn de_days<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let raw = NumberOrString::deserialize(de)?;
    Ok(match raw {
        NumberOrString::Number(n) => n.max(0.0).round() as u32,
        NumberOrString::String(s) => parse_scaled(&s, &[("month", 30), ("week", 7)], 30),
    })
}

/// Plain count: number, or the leading integer of a string ("4 servings").
fn de_count<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let raw = NumberOrString::deserialize(de)?;
    Ok(match raw {
        NumberOrString::Number(n) => n.max(0.0).round() as u32,
        NumberOrString::String(s) => leading_number(&s).unwrap_or(0),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

pub(crate) fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parse a quantity string, scaling by the first matching unit keyword.
pub(crate) fn parse_scaled(s: &str, scales: &[(&str, u32)], fallback: u32) -> u32 {
    let Some(value) = leading_number(s) else {
        return fallback;
    };
    let lower = s.to_lowercase();
    for (unit, factor) in scales {
        if lower.contains(unit) {
            // Absurd quantities saturate instead of overflowing.
            return value.saturating_mul(*factor);
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_recipe_deserializes_with_defaults() {
        let recipe: Recipe = serde_json::from_value(json!({
            "title": "Beef Stew",
            "prepTime": 20
        }))
        .unwrap();

        assert_eq!(recipe.title, "Beef Stew");
        assert_eq!(recipe.prep_time, 20);
        assert_eq!(recipe.cook_time, 0);
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.original_language, "en");
    }

    #[test]
    fn test_lenient_time_parsing() {
        let recipe: Recipe = serde_json::from_value(json!({
            "prepTime": "45 minutes",
            "cookTime": "2 hours",
            "storageTime": "3 weeks",
            "servings": "6 servings"
        }))
        .unwrap();

        assert_eq!(recipe.prep_time, 45);
        assert_eq!(recipe.cook_time, 120);
        assert_eq!(recipe.storage_time, 21);
        assert_eq!(recipe.servings, 6);
    }

    #[test]
    fn test_absurd_quantity_saturates() {
        let recipe: Recipe = serde_json::from_value(json!({
            "storageTime": "700000000 weeks",
            "cookTime": "4000000000 hours"
        }))
        .unwrap();

        assert_eq!(recipe.storage_time, u32::MAX);
        assert_eq!(recipe.cook_time, u32::MAX);
    }

    #[test]
    fn test_unparseable_time_falls_back() {
        let recipe: Recipe = serde_json::from_value(json!({
            "prepTime": "a little while",
            "storageTime": "until spring"
        }))
        .unwrap();

        assert_eq!(recipe.prep_time, 30);
        assert_eq!(recipe.storage_time, 30);
    }

    #[test]
    fn test_camel_case_round_trip() {
        let mut recipe = Recipe::default();
        recipe.prep_instructions = vec!["Chop vegetables".to_string()];
        recipe.kid_friendly = Some(true);

        let value = serde_json::to_value(&recipe).unwrap();
        assert!(value.get("prepInstructions").is_some());
        assert!(value.get("kidFriendly").is_some());
        assert!(value.get("quickMeals").is_none());

        let back: Recipe = serde_json::from_value(value).unwrap();
        assert_eq!(back, recipe);
    }

    #[test]
    fn test_ingredient_completeness() {
        let complete = Ingredient {
            name: "carrots".to_string(),
            amount: "2".to_string(),
            unit: "cups".to_string(),
        };
        assert!(complete.is_complete());

        let missing_unit = Ingredient {
            name: "carrots".to_string(),
            amount: "2".to_string(),
            unit: "".to_string(),
        };
        assert!(!missing_unit.is_complete());
    }
}
