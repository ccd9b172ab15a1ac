use super::prompt::build_improvement_prompt;
use crate::error::{Result, SuggestError};
use crate::model::RecipeImprovements;
use crate::providers::{ModelGateway, StructuredRequest};
use crate::schema;
use log::info;

/// Ask the model for creative ways to improve a set of recipe suggestions.
pub async fn improve_recipe_ideas(
    gateway: &dyn ModelGateway,
    recipe_suggestions: &[String],
) -> Result<RecipeImprovements> {
    if recipe_suggestions.iter().all(|s| s.trim().is_empty()) {
        return Err(SuggestError::InvalidInput(
            "at least one recipe suggestion is required".to_string(),
        ));
    }

    let output = gateway
        .generate_structured(StructuredRequest {
            schema_name: "recipe_improvements",
            schema: schema::improvement_output_schema(),
            prompt: build_improvement_prompt(recipe_suggestions),
            image: None,
        })
        .await?;

    let improvements = match output {
        Some(value) => schema::decode_improvement_output(value)?,
        None => RecipeImprovements::default(),
    };
    info!(
        "Received {} improvement ideas for {} suggestions",
        improvements.improved_recipe_ideas.len(),
        recipe_suggestions.len()
    );
    Ok(improvements)
}
