use super::prompt::build_illustration_prompt;
use crate::error::{Result, SuggestError};
use crate::model::DataUri;
use crate::providers::{Modality, ModelGateway};
use crate::schema;
use serde_json::json;

// Gemini image models refuse requests that only ask for IMAGE.
const ILLUSTRATION_MODALITIES: [Modality; 2] = [Modality::Text, Modality::Image];

/// Generate one illustrative photo of the finished dish.
///
/// Either returns a validated image data URI or fails; there is no partial result.
pub async fn generate_recipe_image(
    gateway: &dyn ModelGateway,
    recipe_title: &str,
) -> Result<DataUri> {
    if recipe_title.trim().is_empty() {
        return Err(SuggestError::InvalidInput(
            "cannot illustrate a recipe without a title".to_string(),
        ));
    }

    let media = gateway
        .generate_media(
            &build_illustration_prompt(recipe_title),
            &ILLUSTRATION_MODALITIES,
        )
        .await?
        .ok_or_else(|| {
            SuggestError::ModelInvocation(
                "Image generation failed or returned no media URL".to_string(),
            )
        })?;

    schema::decode_image_output(json!({ "imageDataUri": media.url }))
}
