//! Recipe suggestions from a photo of ingredients.
//!
//! A generative model proposes recipes for what it sees in the photo, then an
//! image model illustrates each recipe. Illustrations are best-effort: a recipe
//! whose picture could not be generated is still returned, just without one.

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod pipelines;
pub mod providers;
pub mod schema;

pub use builder::{PhotoSource, Provider, RecipeSuggester, RecipeSuggesterBuilder};
pub use config::AppConfig;
pub use error::SuggestError;
pub use model::{DataUri, IngredientPhoto, RecipeImprovements, RecipeSuggestion, SuggestionResult};
pub use orchestrator::{IllustrationOutcome, PipelineStage, SuggestionOrchestrator};
pub use providers::{GatewayFactory, ModelGateway};

/// Suggest illustrated recipes for a photo given as a data URI.
///
/// Uses the provider from `config.toml` / `RECIPE_SNAP__*` environment variables.
pub async fn suggest_recipes(photo_data_uri: &str) -> Result<SuggestionResult, SuggestError> {
    RecipeSuggester::builder()
        .photo_data_uri(photo_data_uri)
        .build()
        .await
}

/// Generate creative improvement ideas for a list of recipe suggestions.
pub async fn improve_recipe_ideas(
    recipe_suggestions: &[String],
) -> Result<RecipeImprovements, SuggestError> {
    let gateway = RecipeSuggester::builder().build_gateway()?;
    pipelines::improve_recipe_ideas(gateway.as_ref(), recipe_suggestions).await
}
