//! Suggestion pipeline: recipes first, then one illustration per recipe.
//!
//! ```text
//! Idle -> AwaitingRecipes -> Failed
//!                         -> Done            (no recipes)
//!                         -> AwaitingImages -> Done
//! ```
//!
//! `AwaitingImages` is a barrier over exactly one illustration per recipe.
//! An illustration failure only costs that recipe its image.

use crate::error::{Result, SuggestError};
use crate::model::{DataUri, IngredientPhoto, RecipeSuggestion, SuggestionResult};
use crate::pipelines::{generate_recipe_image, generate_recipes};
use crate::providers::ModelGateway;
use futures::future::join_all;
use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;

/// Default minimum number of recipes requested per photo
pub const DEFAULT_MIN_RECIPES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    AwaitingRecipes,
    AwaitingImages,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::AwaitingRecipes => "awaiting recipes",
            PipelineStage::AwaitingImages => "awaiting images",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Settled result of one illustration attempt
#[derive(Debug)]
pub enum IllustrationOutcome {
    Illustrated(DataUri),
    Failed(SuggestError),
}

impl From<Result<DataUri>> for IllustrationOutcome {
    fn from(result: Result<DataUri>) -> Self {
        match result {
            Ok(uri) => IllustrationOutcome::Illustrated(uri),
            Err(err) => IllustrationOutcome::Failed(err),
        }
    }
}

pub struct SuggestionOrchestrator {
    gateway: Arc<dyn ModelGateway>,
    min_recipes: u32,
}

impl SuggestionOrchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        SuggestionOrchestrator {
            gateway,
            min_recipes: DEFAULT_MIN_RECIPES,
        }
    }

    /// Set the minimum number of recipes requested from the model
    pub fn with_min_recipes(mut self, min_recipes: u32) -> Self {
        self.min_recipes = min_recipes;
        self
    }

    /// Suggest recipes for a photo and illustrate each of them.
    ///
    /// Fails only when the recipes themselves cannot be obtained. Recipes keep
    /// the order the model returned them in, whatever order their
    /// illustrations finish in.
    pub async fn suggest(&self, photo: &IngredientPhoto) -> Result<SuggestionResult> {
        enter(PipelineStage::Idle, PipelineStage::AwaitingRecipes);

        let suggestions =
            match generate_recipes(self.gateway.as_ref(), photo, self.min_recipes).await {
                Ok(suggestions) => suggestions,
                Err(err) => {
                    enter(PipelineStage::AwaitingRecipes, PipelineStage::Failed);
                    return Err(err);
                }
            };

        if suggestions.is_empty() {
            enter(PipelineStage::AwaitingRecipes, PipelineStage::Done);
            return Ok(suggestions);
        }

        enter(PipelineStage::AwaitingRecipes, PipelineStage::AwaitingImages);
        let outcomes = self.illustrate_all(&suggestions.recipes).await;
        let recipes = merge_illustrations(suggestions.recipes, outcomes);

        info!(
            "Illustrated {} of {} recipes",
            recipes.iter().filter(|r| r.has_image()).count(),
            recipes.len()
        );
        enter(PipelineStage::AwaitingImages, PipelineStage::Done);
        Ok(SuggestionResult { recipes })
    }

    /// Run every illustration concurrently and wait for all of them to settle
    async fn illustrate_all(&self, recipes: &[RecipeSuggestion]) -> Vec<IllustrationOutcome> {
        let gateway = self.gateway.as_ref();
        let attempts = recipes.iter().map(|recipe| async move {
            IllustrationOutcome::from(generate_recipe_image(gateway, &recipe.title).await)
        });
        join_all(attempts).await
    }
}

/// Attach each outcome to the recipe at the same index
pub fn merge_illustrations(
    recipes: Vec<RecipeSuggestion>,
    outcomes: Vec<IllustrationOutcome>,
) -> Vec<RecipeSuggestion> {
    debug_assert_eq!(recipes.len(), outcomes.len());

    recipes
        .into_iter()
        .zip(outcomes)
        .map(|(mut recipe, outcome)| {
            match outcome {
                IllustrationOutcome::Illustrated(uri) => {
                    recipe.image_data_uri = Some(uri.into_string());
                }
                IllustrationOutcome::Failed(err) => {
                    warn!(
                        "Failed to generate image for recipe \"{}\": {}",
                        recipe.title, err
                    );
                }
            }
            recipe
        })
        .collect()
}

fn enter(from: PipelineStage, to: PipelineStage) {
    debug!("Suggestion pipeline: {} -> {}", from, to);
}
