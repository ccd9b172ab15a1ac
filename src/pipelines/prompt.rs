/// Instructions sent alongside the ingredients photo.
///
/// Loaded from `recipe_prompt.txt` at compile time; `{min_recipes}` is
/// substituted by [`build_suggestion_prompt`].
pub const RECIPE_SUGGESTION_PROMPT: &str = include_str!("recipe_prompt.txt");

/// Build the recipe suggestion prompt asking for at least `min_recipes` recipes.
pub fn build_suggestion_prompt(min_recipes: u32) -> String {
    RECIPE_SUGGESTION_PROMPT.replace("{min_recipes}", &min_recipes.max(1).to_string())
}

/// Build the prompt for an illustration of the finished dish.
pub fn build_illustration_prompt(recipe_title: &str) -> String {
    format!(
        "Generate a visually appealing and appetizing photo of the finished dish: \"{}\". \
         The image should closely represent the actual ingredients and cooking style of the recipe. \
         Ensure the dish looks delicious, authentic, and inviting, with attention to detail in the presentation.",
        recipe_title.trim()
    )
}

/// Build the prompt asking for improvement ideas over a list of suggestions.
pub fn build_improvement_prompt(recipe_suggestions: &[String]) -> String {
    let listing: String = recipe_suggestions
        .iter()
        .map(|suggestion| suggestion.trim())
        .filter(|suggestion| !suggestion.is_empty())
        .map(|suggestion| format!("- {}\n", suggestion))
        .collect();

    format!(
        "You are a creative recipe improvement assistant. Given a list of recipe suggestions, \
         generate creative ideas for improving each recipe.\n\n\
         Recipe Suggestions:\n{}\n\
         Generate a list of ideas for improvements to the recipes.",
        listing
    )
}
