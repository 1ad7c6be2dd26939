//! Heuristic classification of instruction steps into prep vs. cooking.
//!
//! Prep instructions for a freezer recipe must not involve cooking; a step
//! that mentions a cooking-action verb is filed under cooking instead. This
//! is a deliberately simple keyword heuristic: false positives are accepted
//! as the cost of a deterministic, explainable rule.

/// Verbs and phrases that mark a step as active cooking.
pub const COOKING_VERBS: &[&str] = &[
    "bake",
    "roast",
    "boil",
    "sauté",
    "saute",
    "fry",
    "grill",
    "cook",
    "simmer",
    "steam",
    "poach",
    "broil",
    "sear",
    "blanch",
    "microwave",
    "pressure cook",
    "slow cook",
    "deep fry",
    "stir-fry",
    "barbecue",
    "braise",
    "stew",
    "toast",
    "char",
    "parboil",
    "reduce",
    "preheat",
    "heat oven",
    "bring to a boil",
    "keep warm",
    "keep hot",
];

/// Whether a step contains any cooking-action verb (case-insensitive).
pub fn contains_cooking_verb(step: &str) -> bool {
    let lower = step.to_lowercase();
    COOKING_VERBS.iter().any(|verb| lower.contains(verb))
}

/// Re-partition instruction steps between prep and cooking.
///
/// Prep steps containing a cooking verb move to the cooking list; cooking
/// steps never move back. Order within each list is preserved, so running
/// the split on its own output is a fixed point.
pub fn split_instructions(
    prep_steps: &[String],
    cooking_steps: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut prep = Vec::with_capacity(prep_steps.len());
    let mut cooking = cooking_steps.to_vec();

    for step in prep_steps {
        if contains_cooking_verb(step) {
            cooking.push(step.clone());
        } else {
            prep.push(step.clone());
        }
    }

    (prep, cooking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_moves_cooking_steps_out_of_prep() {
        let prep = steps(&[
            "Chop the onions and carrots",
            "Preheat the oven to 350F",
            "Label the freezer bags",
        ]);
        let cooking = steps(&["Bake for 45 minutes"]);

        let (new_prep, new_cooking) = split_instructions(&prep, &cooking);

        assert_eq!(
            new_prep,
            steps(&["Chop the onions and carrots", "Label the freezer bags"])
        );
        assert_eq!(
            new_cooking,
            steps(&["Bake for 45 minutes", "Preheat the oven to 350F"])
        );
    }

    #[test]
    fn test_case_insensitive_matching() {
        let prep = steps(&["SIMMER gently for ten minutes"]);
        let (new_prep, new_cooking) = split_instructions(&prep, &[]);
        assert!(new_prep.is_empty());
        assert_eq!(new_cooking.len(), 1);
    }

    #[test]
    fn test_split_is_a_fixed_point() {
        let prep = steps(&["Dice the chicken", "Sauté the garlic", "Portion into bags"]);
        let cooking = steps(&["Simmer the sauce"]);

        let (prep1, cooking1) = split_instructions(&prep, &cooking);
        let (prep2, cooking2) = split_instructions(&prep1, &cooking1);

        assert_eq!(prep1, prep2);
        assert_eq!(cooking1, cooking2);
    }

    #[test]
    fn test_order_is_preserved() {
        let prep = steps(&["step a", "bake step b", "step c", "boil step d", "step e"]);
        let cooking = steps(&["existing 1", "existing 2"]);

        let (new_prep, new_cooking) = split_instructions(&prep, &cooking);

        assert_eq!(new_prep, steps(&["step a", "step c", "step e"]));
        assert_eq!(
            new_cooking,
            steps(&["existing 1", "existing 2", "bake step b", "boil step d"])
        );
    }

    #[test]
    fn test_incidental_mention_still_moves() {
        // Known trade-off: "heat" alone does not match, but "cook" anywhere does.
        let prep = steps(&["Set aside until ready to cook"]);
        let (new_prep, new_cooking) = split_instructions(&prep, &[]);
        assert!(new_prep.is_empty());
        assert_eq!(new_cooking.len(), 1);
    }
}
