//! Recipe generation: prompt, resilient call, defensive parse, normalize.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::audit::GENERATION_REQUIRED_FIELDS;
use crate::classify::split_instructions;
use crate::error::GenerationError;
use crate::extract::extract_object;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::prompts::{render_user_prompt, GENERATION_SYSTEM_PROMPT};
use crate::resilience::ResilientInvoker;
use crate::types::{GenerationRequest, Recipe};

/// Season words to strip out of generated titles. The season is tracked as
/// its own field; "Winter Beef Stew" reads as clutter next to it.
static SEASON_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(winter|spring|summer|fall|autumn)\b").expect("invalid season regex")
});

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

/// Generates recipes through a provider behind the resilience layer.
pub struct RecipeGenerator {
    provider: Arc<dyn LlmProvider>,
    invoker: ResilientInvoker,
}

impl RecipeGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, invoker: ResilientInvoker) -> Self {
        Self { provider, invoker }
    }

    /// Generate one recipe for the request.
    ///
    /// The reply is parsed defensively, checked for required fields, and
    /// normalized: season word stripped from the title, cooking steps moved
    /// out of prep, season and language stamped.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Recipe, GenerationError> {
        let trace_id = uuid::Uuid::new_v4();
        tracing::info!(
            %trace_id,
            season = %request.season,
            recipe_name = request.recipe_name.as_deref().unwrap_or("(open)"),
            "generating recipe"
        );

        let completion =
            CompletionRequest::new(GENERATION_SYSTEM_PROMPT, render_user_prompt(request));
        let provider = Arc::clone(&self.provider);

        let text = self
            .invoker
            .invoke(move || {
                let provider = provider.clone();
                let completion = completion.clone();
                async move { provider.complete(&completion).await }
            })
            .await?;

        // Extraction runs outside the invoker: a garbled but delivered reply
        // is not a provider outage and must not feed the breaker.
        let value = extract_object(&text)?;
        let mut recipe: Recipe = serde_json::from_value(value)?;

        let missing: Vec<String> = GENERATION_REQUIRED_FIELDS
            .iter()
            .filter(|field| field.needs_repair(&recipe))
            .map(|field| field.wire_name().to_string())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(%trace_id, missing = ?missing, "generated recipe incomplete");
            return Err(GenerationError::MissingFields(missing));
        }

        recipe.title = clean_title(&recipe.title);
        let (prep, cooking) =
            split_instructions(&recipe.prep_instructions, &recipe.cooking_instructions);
        recipe.prep_instructions = prep;
        recipe.cooking_instructions = cooking;
        recipe.season = request.season.clone();
        if recipe.original_language.trim().is_empty() {
            recipe.original_language = "en".to_string();
        }

        tracing::info!(%trace_id, title = %recipe.title, "recipe generated");
        Ok(recipe)
    }
}

/// Strip season words from a title, collapse whitespace, and capitalize.
pub fn clean_title(title: &str) -> String {
    let stripped = SEASON_WORD_REGEX.replace_all(title, "");
    let collapsed = WHITESPACE_REGEX.replace_all(stripped.trim(), " ");

    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::llm::FakeProvider;
    use std::time::Duration;

    const STEW_JSON: &str = r#"{
        "title": "winter hearty beef stew",
        "description": "Tender beef and root vegetables, frozen flat.",
        "ingredients": [{"name": "beef chuck", "amount": "2", "unit": "lbs"}],
        "prepInstructions": ["Cube the beef", "Preheat the oven to 350F"],
        "prepTime": 25,
        "cookTime": 90,
        "servings": 6,
        "tags": ["beef", "hearty"],
        "storageTime": 90,
        "containerSuggestions": ["gallon freezer bag"],
        "defrostInstructions": ["Thaw overnight"],
        "cookingInstructions": ["Simmer on low for 8 hours"],
        "servingInstructions": ["Serve over mashed potatoes"],
        "allergenInfo": ["None"],
        "dietaryInfo": ["High-protein"]
    }"#;

    fn generator(fake: FakeProvider) -> RecipeGenerator {
        let config = CoreConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            rate_limit_interval: Duration::ZERO,
            ..CoreConfig::default()
        };
        RecipeGenerator::new(Arc::new(fake), ResilientInvoker::new(&config))
    }

    #[tokio::test]
    async fn test_generates_and_normalizes() {
        let generator = generator(FakeProvider::with_response("winter season", STEW_JSON));
        let recipe = generator
            .generate(&GenerationRequest::for_season("winter"))
            .await
            .unwrap();

        assert_eq!(recipe.title, "Hearty beef stew");
        assert_eq!(recipe.season, "winter");
        assert_eq!(recipe.original_language, "en");

        // The preheat step moved from prep to cooking.
        assert_eq!(recipe.prep_instructions, vec!["Cube the beef".to_string()]);
        assert_eq!(
            recipe.cooking_instructions,
            vec![
                "Simmer on low for 8 hours".to_string(),
                "Preheat the oven to 350F".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_accepts_fenced_reply() {
        let fenced = format!("```json\n{STEW_JSON}\n```");
        let generator = generator(FakeProvider::with_response("winter season", &fenced));
        let recipe = generator
            .generate(&GenerationRequest::for_season("winter"))
            .await
            .unwrap();
        assert_eq!(recipe.servings, 6);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let incomplete = r#"{"title": "Soup", "description": "A soup."}"#;
        let generator = generator(FakeProvider::with_response("winter season", incomplete));

        let err = generator
            .generate(&GenerationRequest::for_season("winter"))
            .await
            .unwrap_err();

        match err {
            GenerationError::MissingFields(fields) => {
                assert!(fields.contains(&"ingredients".to_string()));
                assert!(fields.contains(&"prepTime".to_string()));
                assert!(!fields.contains(&"title".to_string()));
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_reply_is_extract_error() {
        let generator = generator(
            FakeProvider::new().with_default_response("Sorry, I cannot help with that."),
        );

        let err = generator
            .generate(&GenerationRequest::for_season("winter"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Extract(_)));
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Winter Beef Stew"), "Beef Stew");
        assert_eq!(clean_title("summer  garden   salad"), "Garden salad");
        assert_eq!(clean_title("Beef Stew"), "Beef Stew");
        assert_eq!(clean_title("autumn"), "");
    }
}
