//! Repair prompt: asks the model for one replacement field value given a
//! trimmed context of the recipe being repaired.

/// System prompt for single-field repair calls.
pub const REPAIR_SYSTEM_PROMPT: &str = r#"You are a professional chef fixing a freezer-prep recipe record. You will be given the recipe's current state and the name of one field that is missing or invalid.

Respond with exactly one JSON object containing only that field, for example {"prepTime": 25}. No other text, no HTML tags or entities.

Field formats:
- title, description: plain strings (description at most 150 characters)
- ingredients: array of {"name", "amount", "unit"} objects
- prepInstructions, cookingInstructions, defrostInstructions, servingInstructions, containerSuggestions, tags, allergenInfo, dietaryInfo: arrays of strings
- prepTime, cookTime (minutes), servings, storageTime (days): numbers
- kidFriendly, quickMeals, healthy: booleans"#;

/// Render the user prompt for repairing one field.
///
/// `context_json` is the trimmed recipe context, already serialized.
pub fn render_repair_prompt(field_name: &str, context_json: &str) -> String {
    format!(
        "Recipe context:\n{context_json}\n\nProvide a value for the missing field: \"{field_name}\"."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_field() {
        let prompt = render_repair_prompt("prepTime", "{\"title\": \"Beef Stew\"}");
        assert!(prompt.contains("missing field: \"prepTime\""));
        assert!(prompt.contains("Beef Stew"));
    }
}
