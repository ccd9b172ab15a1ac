use super::prompt::build_suggestion_prompt;
use crate::error::Result;
use crate::model::{IngredientPhoto, SuggestionResult};
use crate::providers::{ModelGateway, StructuredRequest};
use crate::schema;
use log::{debug, info};

/// Ask the model for recipes that can be cooked from the photographed ingredients.
///
/// The returned recipes carry no illustrations. A model that produces no
/// output yields an empty result rather than an error.
pub async fn generate_recipes(
    gateway: &dyn ModelGateway,
    photo: &IngredientPhoto,
    min_recipes: u32,
) -> Result<SuggestionResult> {
    debug!(
        "Requesting at least {} recipes from {} for a {} photo",
        min_recipes,
        gateway.gateway_name(),
        photo.data_uri().mime_type()
    );

    let output = gateway
        .generate_structured(StructuredRequest {
            schema_name: "recipe_suggestions",
            schema: schema::recipe_output_schema(),
            prompt: build_suggestion_prompt(min_recipes),
            image: Some(photo.data_uri()),
        })
        .await?;

    let Some(value) = output else {
        info!("{} returned no recipe output", gateway.gateway_name());
        return Ok(SuggestionResult::default());
    };

    let recipes = schema::decode_recipe_output(value)?;
    info!("Received {} recipe suggestions", recipes.len());
    Ok(SuggestionResult { recipes })
}
