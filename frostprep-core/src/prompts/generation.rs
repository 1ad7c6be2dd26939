//! Generation prompt: asks the model for one complete freezer-prep recipe
//! as a single JSON object matching the wire schema.

use crate::types::GenerationRequest;

/// System prompt describing the role and the exact output schema.
///
/// The schema mirrors [`crate::types::Recipe`]'s wire format; the model is
/// told to emit JSON only, though nothing downstream trusts that.
pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are a professional chef specializing in batch freezer meal preparation. You create recipes that are assembled ahead of time, frozen, and cooked later.

Every recipe must follow freezer-prep conventions:
- Prep instructions cover only assembly and packaging; no cooking happens during prep.
- Cooking instructions describe how to cook the dish after freezing and defrosting.
- Storage, container, and defrost guidance must be specific and practical.

Respond with exactly one JSON object and no other text, using this schema:
{
  "title": "string",
  "description": "string, at most 150 characters",
  "ingredients": [{"name": "string", "amount": "string", "unit": "string"}],
  "prepInstructions": ["string"],
  "prepTime": number (minutes),
  "cookTime": number (minutes),
  "servings": number,
  "tags": ["string"],
  "storageTime": number (days frozen),
  "containerSuggestions": ["string"],
  "defrostInstructions": ["string"],
  "cookingInstructions": ["string"],
  "servingInstructions": ["string"],
  "allergenInfo": ["string"],
  "dietaryInfo": ["string"]
}

Do not use HTML tags or entities anywhere. Plain text only."#;

/// Render the user prompt for a generation request.
pub fn render_user_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Create a freezer-prep recipe for the {} season.",
        request.season
    );

    if let Some(name) = &request.recipe_name {
        prompt.push_str(&format!(" The recipe should be: {}.", name));
    }
    if let Some(ingredients) = &request.ingredients {
        if !ingredients.is_empty() {
            prompt.push_str(&format!(
                " It must use these ingredients: {}.",
                ingredients.join(", ")
            ));
        }
    }
    if let Some(restrictions) = &request.dietary_restrictions {
        if !restrictions.is_empty() {
            prompt.push_str(&format!(
                " Respect these dietary restrictions: {}.",
                restrictions.join(", ")
            ));
        }
    }
    if let Some(cuisine) = &request.cuisine {
        prompt.push_str(&format!(" The cuisine should be {}.", cuisine));
    }
    if let Some(servings) = request.servings {
        prompt.push_str(&format!(" It should serve {} people.", servings));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request() {
        let prompt = render_user_prompt(&GenerationRequest::for_season("winter"));
        assert!(prompt.contains("winter season"));
        assert!(!prompt.contains("ingredients:"));
    }

    #[test]
    fn test_full_request() {
        let request = GenerationRequest {
            season: "summer".to_string(),
            recipe_name: Some("Grilled Chicken Skewers".to_string()),
            ingredients: Some(vec!["chicken".to_string(), "bell peppers".to_string()]),
            dietary_restrictions: Some(vec!["gluten-free".to_string()]),
            cuisine: Some("Mediterranean".to_string()),
            servings: Some(4),
        };

        let prompt = render_user_prompt(&request);
        assert!(prompt.contains("Grilled Chicken Skewers"));
        assert!(prompt.contains("chicken, bell peppers"));
        assert!(prompt.contains("gluten-free"));
        assert!(prompt.contains("Mediterranean"));
        assert!(prompt.contains("serve 4 people"));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let request = GenerationRequest {
            season: "fall".to_string(),
            ingredients: Some(Vec::new()),
            dietary_restrictions: Some(Vec::new()),
            ..Default::default()
        };

        let prompt = render_user_prompt(&request);
        assert!(!prompt.contains("must use"));
        assert!(!prompt.contains("restrictions"));
    }
}
