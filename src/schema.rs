//! Shapes of the data crossing the model gateway boundary.
//!
//! Every value produced by a gateway goes through one of the `decode_*`
//! functions before the rest of the crate sees it. Each shape is also
//! available as a JSON Schema so gateways can constrain model output.

use crate::error::{Result, SuggestError};
use crate::model::{DataUri, RecipeImprovements, RecipeSuggestion};
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct RecipeOutput {
    recipes: Vec<RecipeRecord>,
}

#[derive(Debug, Deserialize)]
struct RecipeRecord {
    title: String,
    description: String,
    ingredients: Vec<String>,
    instructions: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageOutput {
    image_data_uri: String,
}

/// JSON Schema for the recipe generation output
pub fn recipe_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recipes": {
                "type": "array",
                "description": "A list of suggested recipes.",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The title of the recipe."
                        },
                        "description": {
                            "type": "string",
                            "description": "A brief description of the recipe."
                        },
                        "ingredients": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "A list of ingredients for the recipe."
                        },
                        "instructions": {
                            "type": "string",
                            "description": "Detailed, step-by-step preparation instructions for the recipe."
                        }
                    },
                    "required": ["title", "description", "ingredients", "instructions"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["recipes"],
        "additionalProperties": false
    })
}

/// JSON Schema for the recipe improvement output
pub fn improvement_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "improvedRecipeIdeas": {
                "type": "array",
                "items": { "type": "string" },
                "description": "A list of creative ideas for improvements to the recipe."
            }
        },
        "required": ["improvedRecipeIdeas"],
        "additionalProperties": false
    })
}

/// Validate the recipe generation output.
///
/// The returned recipes never carry an image.
pub fn decode_recipe_output(value: Value) -> Result<Vec<RecipeSuggestion>> {
    let output: RecipeOutput = serde_json::from_value(value)
        .map_err(|e| SuggestError::SchemaValidation(format!("recipe output: {}", e)))?;

    output
        .recipes
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if record.title.trim().is_empty() {
                return Err(SuggestError::SchemaValidation(format!(
                    "recipe output: recipe {} has an empty title",
                    index
                )));
            }
            Ok(RecipeSuggestion {
                title: record.title,
                description: record.description,
                ingredients: record.ingredients,
                instructions: record.instructions,
                image_data_uri: None,
            })
        })
        .collect()
}

/// Validate the image generation output, `{ "imageDataUri": "data:image/...;base64,..." }`
pub fn decode_image_output(value: Value) -> Result<DataUri> {
    let output: ImageOutput = serde_json::from_value(value)
        .map_err(|e| SuggestError::SchemaValidation(format!("image output: {}", e)))?;

    let uri = DataUri::parse(&output.image_data_uri)
        .map_err(|e| SuggestError::SchemaValidation(format!("image output: {}", e)))?;
    if !uri.is_image() {
        return Err(SuggestError::SchemaValidation(format!(
            "image output: expected an image MIME type, got '{}'",
            uri.mime_type()
        )));
    }

    debug!(
        "Validated {} illustration ({} base64 chars)",
        uri.mime_type(),
        uri.base64_payload().len()
    );
    Ok(uri)
}

/// Validate the recipe improvement output
pub fn decode_improvement_output(value: Value) -> Result<RecipeImprovements> {
    serde_json::from_value(value)
        .map_err(|e| SuggestError::SchemaValidation(format!("improvement output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_json(title: &str) -> Value {
        json!({
            "title": title,
            "description": "A weeknight favourite",
            "ingredients": ["200 g spaghetti", "2 tbsp finely chopped fresh basil"],
            "instructions": "1. Boil pasta for 9 minutes.\n2. Toss with basil."
        })
    }

    #[test]
    fn test_decode_recipe_output_preserves_order() {
        let value = json!({
            "recipes": [recipe_json("Tomato Basil Pasta"), recipe_json("Caprese Salad")]
        });

        let recipes = decode_recipe_output(value).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].title, "Tomato Basil Pasta");
        assert_eq!(recipes[1].title, "Caprese Salad");
        assert!(recipes.iter().all(|r| r.image_data_uri.is_none()));
        assert_eq!(recipes[0].ingredients.len(), 2);
    }

    #[test]
    fn test_decode_recipe_output_empty_list() {
        let recipes = decode_recipe_output(json!({ "recipes": [] })).unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_decode_recipe_output_drops_model_supplied_image() {
        let mut recipe = recipe_json("Shakshuka");
        recipe["imageDataUri"] = json!("data:image/png;base64,AAAA");

        let recipes = decode_recipe_output(json!({ "recipes": [recipe] })).unwrap();
        assert!(recipes[0].image_data_uri.is_none());
    }

    #[test]
    fn test_decode_recipe_output_rejects_bad_shapes() {
        let missing_recipes = decode_recipe_output(json!({ "dishes": [] }));
        assert!(matches!(missing_recipes, Err(SuggestError::SchemaValidation(_))));

        let mut wrong_type = recipe_json("Omelette");
        wrong_type["ingredients"] = json!("eggs, butter");
        let result = decode_recipe_output(json!({ "recipes": [wrong_type] }));
        assert!(matches!(result, Err(SuggestError::SchemaValidation(_))));

        let mut missing_field = recipe_json("Omelette");
        missing_field.as_object_mut().unwrap().remove("instructions");
        let result = decode_recipe_output(json!({ "recipes": [missing_field] }));
        assert!(matches!(result, Err(SuggestError::SchemaValidation(_))));

        let result = decode_recipe_output(json!("not an object"));
        assert!(matches!(result, Err(SuggestError::SchemaValidation(_))));
    }

    #[test]
    fn test_decode_recipe_output_rejects_blank_title() {
        let value = json!({ "recipes": [recipe_json("Soup"), recipe_json("   ")] });
        match decode_recipe_output(value) {
            Err(SuggestError::SchemaValidation(msg)) => assert!(msg.contains("recipe 1")),
            other => panic!("Expected SchemaValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_image_output() {
        let uri =
            decode_image_output(json!({ "imageDataUri": "data:image/png;base64,AAAA" })).unwrap();
        assert_eq!(uri.mime_type(), "image/png");
    }

    #[test]
    fn test_decode_image_output_rejects_non_images() {
        let text = decode_image_output(json!({ "imageDataUri": "data:text/plain;base64,AAAA" }));
        assert!(matches!(text, Err(SuggestError::SchemaValidation(_))));

        let url = decode_image_output(json!({ "imageDataUri": "https://example.com/dish.png" }));
        assert!(matches!(url, Err(SuggestError::SchemaValidation(_))));

        let missing = decode_image_output(json!({}));
        assert!(matches!(missing, Err(SuggestError::SchemaValidation(_))));
    }

    #[test]
    fn test_decode_improvement_output() {
        let value = json!({ "improvedRecipeIdeas": ["Add toasted pine nuts", "Finish with lemon zest"] });
        let improvements = decode_improvement_output(value).unwrap();
        assert_eq!(improvements.improved_recipe_ideas.len(), 2);

        let result = decode_improvement_output(json!({ "ideas": [] }));
        assert!(matches!(result, Err(SuggestError::SchemaValidation(_))));
    }

    #[test]
    fn test_schemas_require_every_field() {
        let schema = recipe_output_schema();
        let required = schema["properties"]["recipes"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 4);
        assert_eq!(improvement_output_schema()["required"][0], "improvedRecipeIdeas");
    }
}
