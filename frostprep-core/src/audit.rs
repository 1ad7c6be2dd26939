//! Audit and repair of stored recipes.
//!
//! One pass over a recipe: find fields that are missing or structurally
//! invalid, ask the model for a replacement value per field, coerce each
//! reply into the field's native type, and re-validate. A failed repair of
//! one field never blocks the others; it is logged and noted, and the field
//! stays unset.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ValidationLimits;
use crate::error::AuditError;
use crate::extract::extract_json;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::prompts::{render_repair_prompt, REPAIR_SYSTEM_PROMPT};
use crate::resilience::{InvokeError, ResilientInvoker};
use crate::types::{leading_number, parse_scaled, AuditResult, Ingredient, Recipe};
use crate::validate::validate;

/// The native shape of a repairable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextList,
    Ingredients,
    /// Duration in minutes; "2 hours" scales.
    Minutes,
    /// Duration in days; "3 weeks" and "2 months" scale.
    Days,
    /// Plain count such as servings.
    Count,
    Flag,
}

/// Every field the audit pass knows how to inspect and repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeField {
    Title,
    Description,
    Ingredients,
    PrepInstructions,
    PrepTime,
    CookTime,
    Servings,
    Tags,
    StorageTime,
    ContainerSuggestions,
    DefrostInstructions,
    CookingInstructions,
    ServingInstructions,
    KidFriendly,
    QuickMeals,
    Healthy,
}

/// Fields a freshly generated recipe must carry.
pub const GENERATION_REQUIRED_FIELDS: &[RecipeField] = &[
    RecipeField::Title,
    RecipeField::Description,
    RecipeField::Ingredients,
    RecipeField::PrepInstructions,
    RecipeField::PrepTime,
    RecipeField::CookTime,
    RecipeField::Servings,
    RecipeField::Tags,
    RecipeField::StorageTime,
    RecipeField::ContainerSuggestions,
    RecipeField::DefrostInstructions,
    RecipeField::CookingInstructions,
    RecipeField::ServingInstructions,
];

/// Fields the audit pass inspects: everything generation requires plus the
/// classification flags.
pub const AUDIT_FIELDS: &[RecipeField] = &[
    RecipeField::Title,
    RecipeField::Description,
    RecipeField::Ingredients,
    RecipeField::PrepInstructions,
    RecipeField::PrepTime,
    RecipeField::CookTime,
    RecipeField::Servings,
    RecipeField::Tags,
    RecipeField::StorageTime,
    RecipeField::ContainerSuggestions,
    RecipeField::DefrostInstructions,
    RecipeField::CookingInstructions,
    RecipeField::ServingInstructions,
    RecipeField::KidFriendly,
    RecipeField::QuickMeals,
    RecipeField::Healthy,
];

impl RecipeField {
    /// Wire (camelCase) name used in prompts, JSON, and audit reports.
    pub fn wire_name(&self) -> &'static str {
        match self {
            RecipeField::Title => "title",
            RecipeField::Description => "description",
            RecipeField::Ingredients => "ingredients",
            RecipeField::PrepInstructions => "prepInstructions",
            RecipeField::PrepTime => "prepTime",
            RecipeField::CookTime => "cookTime",
            RecipeField::Servings => "servings",
            RecipeField::Tags => "tags",
            RecipeField::StorageTime => "storageTime",
            RecipeField::ContainerSuggestions => "containerSuggestions",
            RecipeField::DefrostInstructions => "defrostInstructions",
            RecipeField::CookingInstructions => "cookingInstructions",
            RecipeField::ServingInstructions => "servingInstructions",
            RecipeField::KidFriendly => "kidFriendly",
            RecipeField::QuickMeals => "quickMeals",
            RecipeField::Healthy => "healthy",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            RecipeField::Title | RecipeField::Description => FieldKind::Text,
            RecipeField::Ingredients => FieldKind::Ingredients,
            RecipeField::PrepInstructions
            | RecipeField::Tags
            | RecipeField::ContainerSuggestions
            | RecipeField::DefrostInstructions
            | RecipeField::CookingInstructions
            | RecipeField::ServingInstructions => FieldKind::TextList,
            RecipeField::PrepTime | RecipeField::CookTime => FieldKind::Minutes,
            RecipeField::StorageTime => FieldKind::Days,
            RecipeField::Servings => FieldKind::Count,
            RecipeField::KidFriendly | RecipeField::QuickMeals | RecipeField::Healthy => {
                FieldKind::Flag
            }
        }
    }

    /// Whether this field is missing or structurally unusable in `recipe`.
    pub fn needs_repair(&self, recipe: &Recipe) -> bool {
        match self {
            RecipeField::Title => recipe.title.trim().is_empty(),
            RecipeField::Description => recipe.description.trim().is_empty(),
            RecipeField::Ingredients => {
                recipe.ingredients.is_empty()
                    || recipe.ingredients.iter().any(|i| !i.is_complete())
            }
            RecipeField::PrepInstructions => recipe.prep_instructions.is_empty(),
            RecipeField::PrepTime => recipe.prep_time == 0,
            RecipeField::CookTime => recipe.cook_time == 0,
            RecipeField::Servings => recipe.servings == 0,
            RecipeField::Tags => recipe.tags.is_empty(),
            RecipeField::StorageTime => recipe.storage_time == 0,
            RecipeField::ContainerSuggestions => recipe.container_suggestions.is_empty(),
            RecipeField::DefrostInstructions => recipe.defrost_instructions.is_empty(),
            RecipeField::CookingInstructions => recipe.cooking_instructions.is_empty(),
            RecipeField::ServingInstructions => recipe.serving_instructions.is_empty(),
            RecipeField::KidFriendly => recipe.kid_friendly.is_none(),
            RecipeField::QuickMeals => recipe.quick_meals.is_none(),
            RecipeField::Healthy => recipe.healthy.is_none(),
        }
    }

    /// Write a coerced value into the recipe. Mismatched variants are
    /// ignored; [`coerce`] keyed on [`Self::kind`] never produces one.
    pub fn apply(&self, recipe: &mut Recipe, value: FieldValue) {
        match (self, value) {
            (RecipeField::Title, FieldValue::Text(s)) => recipe.title = s,
            (RecipeField::Description, FieldValue::Text(s)) => recipe.description = s,
            (RecipeField::Ingredients, FieldValue::Ingredients(v)) => recipe.ingredients = v,
            (RecipeField::PrepInstructions, FieldValue::TextList(v)) => {
                recipe.prep_instructions = v
            }
            (RecipeField::PrepTime, FieldValue::Number(n)) => recipe.prep_time = n,
            (RecipeField::CookTime, FieldValue::Number(n)) => recipe.cook_time = n,
            (RecipeField::Servings, FieldValue::Number(n)) => recipe.servings = n,
            (RecipeField::Tags, FieldValue::TextList(v)) => recipe.tags = v,
            (RecipeField::StorageTime, FieldValue::Number(n)) => recipe.storage_time = n,
            (RecipeField::ContainerSuggestions, FieldValue::TextList(v)) => {
                recipe.container_suggestions = v
            }
            (RecipeField::DefrostInstructions, FieldValue::TextList(v)) => {
                recipe.defrost_instructions = v
            }
            (RecipeField::CookingInstructions, FieldValue::TextList(v)) => {
                recipe.cooking_instructions = v
            }
            (RecipeField::ServingInstructions, FieldValue::TextList(v)) => {
                recipe.serving_instructions = v
            }
            (RecipeField::KidFriendly, FieldValue::Flag(b)) => recipe.kid_friendly = Some(b),
            (RecipeField::QuickMeals, FieldValue::Flag(b)) => recipe.quick_meals = Some(b),
            (RecipeField::Healthy, FieldValue::Flag(b)) => recipe.healthy = Some(b),
            (field, value) => {
                tracing::warn!(field = field.wire_name(), ?value, "mismatched repair value")
            }
        }
    }
}

/// A repair value coerced into a field's native shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    TextList(Vec<String>),
    Ingredients(Vec<Ingredient>),
    Number(u32),
    Flag(bool),
}

/// Coerce a raw JSON value into the shape `kind` requires.
///
/// The model is given exact formats but routinely strays: numbers arrive as
/// "45 minutes", booleans as "true", single strings where arrays belong.
/// Each coercion accepts the common strays for its kind and rejects the rest.
pub fn coerce(kind: FieldKind, value: &Value) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => match value {
            Value::String(s) if !s.trim().is_empty() => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            _ => None,
        },
        FieldKind::TextList => match value {
            Value::Array(items) if !items.is_empty() => {
                let strings: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Some(FieldValue::TextList(strings))
            }
            // A lone string stands in for a one-element array.
            Value::String(s) if !s.trim().is_empty() => {
                Some(FieldValue::TextList(vec![s.clone()]))
            }
            _ => None,
        },
        FieldKind::Ingredients => {
            let parsed: Vec<Ingredient> = serde_json::from_value(value.clone()).ok()?;
            if parsed.is_empty() || parsed.iter().any(|i| !i.is_complete()) {
                None
            } else {
                Some(FieldValue::Ingredients(parsed))
            }
        }
        FieldKind::Minutes => coerce_number(value, &[("hour", 60), ("hr", 60)]),
        FieldKind::Days => coerce_number(value, &[("month", 30), ("week", 7)]),
        FieldKind::Count => match value {
            Value::Number(n) => n.as_f64().map(|f| FieldValue::Number(f.max(0.0).round() as u32)),
            Value::String(s) => leading_number(s).map(FieldValue::Number),
            _ => None,
        },
        FieldKind::Flag => match value {
            Value::Bool(b) => Some(FieldValue::Flag(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Some(FieldValue::Flag(true)),
                "false" => Some(FieldValue::Flag(false)),
                // Any other non-empty string is truthy.
                other => Some(FieldValue::Flag(!other.is_empty())),
            },
            Value::Number(n) => Some(FieldValue::Flag(n.as_f64().unwrap_or(0.0) != 0.0)),
            _ => None,
        },
    }
}

fn coerce_number(value: &Value, scales: &[(&str, u32)]) -> Option<FieldValue> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| FieldValue::Number(f.max(0.0).round() as u32)),
        Value::String(s) => Some(FieldValue::Number(parse_scaled(s, scales, 30))),
        _ => None,
    }
}

/// Trimmed recipe state sent along with each repair prompt. Long fields
/// that never inform a repair (defrost text and the like) are left out to
/// keep the prompt small.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairContext<'a> {
    title: &'a str,
    description: &'a str,
    ingredients: &'a [Ingredient],
    prep_instructions: &'a [String],
    cooking_instructions: &'a [String],
    tags: &'a [String],
    servings: u32,
    prep_time: u32,
    cook_time: u32,
    season: &'a str,
}

impl<'a> From<&'a Recipe> for RepairContext<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        Self {
            title: &recipe.title,
            description: &recipe.description,
            ingredients: &recipe.ingredients,
            prep_instructions: &recipe.prep_instructions,
            cooking_instructions: &recipe.cooking_instructions,
            tags: &recipe.tags,
            servings: recipe.servings,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            season: &recipe.season,
        }
    }
}

#[derive(Debug, Error)]
enum RepairFieldError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("reply could not be coerced: {0}")]
    Rejected(String),
}

/// Runs the audit/repair pass against a provider.
pub struct AuditOrchestrator {
    provider: Arc<dyn LlmProvider>,
    invoker: ResilientInvoker,
    limits: ValidationLimits,
}

impl AuditOrchestrator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        invoker: ResilientInvoker,
        limits: ValidationLimits,
    ) -> Self {
        Self {
            provider,
            invoker,
            limits,
        }
    }

    /// Audit a recipe and repair whatever is missing, in one pass.
    ///
    /// `is_valid` reports the state of the recipe as it arrived; a repaired
    /// copy, when any repair was attempted, is returned in `fixed_recipe`
    /// whether or not every repair succeeded.
    pub async fn audit(&self, recipe: &Recipe) -> Result<AuditResult, AuditError> {
        let mut notes = Vec::new();

        let missing: Vec<RecipeField> = AUDIT_FIELDS
            .iter()
            .copied()
            .filter(|field| field.needs_repair(recipe))
            .collect();
        let missing_names: Vec<String> = missing
            .iter()
            .map(|field| field.wire_name().to_string())
            .collect();

        if missing.is_empty() {
            notes.push("all audited fields present".to_string());
            for issue in validate(recipe, &self.limits) {
                notes.push(format!("validation: {} - {}", issue.field, issue.message));
            }
            return Ok(AuditResult {
                is_valid: true,
                missing_fields: Vec::new(),
                fixed_recipe: None,
                audit_notes: notes,
            });
        }

        tracing::info!(
            title = %recipe.title,
            missing = ?missing_names,
            "audit found fields needing repair"
        );

        let mut working = recipe.clone();
        for field in missing {
            // Context reflects repairs already applied this pass.
            let context = serde_json::to_string(&RepairContext::from(&working))?;

            match self.repair_field(field, &context).await {
                Ok(value) => {
                    field.apply(&mut working, value);
                    notes.push(format!("repaired {}", field.wire_name()));
                }
                Err(e) => {
                    tracing::warn!(
                        field = field.wire_name(),
                        error = %e,
                        "field repair failed"
                    );
                    notes.push(format!("could not repair {}: {}", field.wire_name(), e));
                }
            }
        }

        let remaining = validate(&working, &self.limits);
        if remaining.is_empty() {
            notes.push("post-repair validation clean".to_string());
        } else {
            notes.push(format!(
                "{} validation issue(s) remain after repair",
                remaining.len()
            ));
        }

        Ok(AuditResult {
            is_valid: false,
            missing_fields: missing_names,
            fixed_recipe: Some(working),
            audit_notes: notes,
        })
    }

    async fn repair_field(
        &self,
        field: RecipeField,
        context_json: &str,
    ) -> Result<FieldValue, RepairFieldError> {
        let prompt = render_repair_prompt(field.wire_name(), context_json);
        let request =
            CompletionRequest::new(REPAIR_SYSTEM_PROMPT, prompt).with_sampling(0.3, 800);
        let provider = Arc::clone(&self.provider);

        let reply = self
            .invoker
            .invoke(move || {
                let provider = provider.clone();
                let request = request.clone();
                async move {
                    let text = provider.complete(&request).await?;
                    // Unparseable repair replies count as provider failures.
                    let value = extract_json(&text)?;
                    Ok(value)
                }
            })
            .await?;

        let payload = unwrap_field_payload(&reply, field.wire_name());
        coerce(field.kind(), &payload)
            .ok_or_else(|| RepairFieldError::Rejected(payload.to_string()))
    }
}

/// Pull the field value out of the model's reply, which may be the asked-for
/// wrapper object, a single-key object under the wrong name, or a bare value.
fn unwrap_field_payload(reply: &Value, wire_name: &str) -> Value {
    if let Value::Object(map) = reply {
        if let Some(inner) = map.get(wire_name) {
            return inner.clone();
        }
        if map.len() == 1 {
            if let Some(inner) = map.values().next() {
                return inner.clone();
            }
        }
    }
    reply.clone()
}
