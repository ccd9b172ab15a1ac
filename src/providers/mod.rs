mod factory;
mod google;
mod open_ai;

pub use factory::GatewayFactory;
pub use google::GoogleGateway;
pub use open_ai::OpenAIGateway;

use crate::error::{Result, SuggestError};
use crate::model::DataUri;
use async_trait::async_trait;
use serde_json::Value;

/// Output modality a gateway is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "TEXT",
            Modality::Image => "IMAGE",
        }
    }
}

/// A prompt whose answer must conform to a JSON Schema
#[derive(Debug, Clone)]
pub struct StructuredRequest<'a> {
    /// Short identifier for the output shape (e.g. "recipe_suggestions")
    pub schema_name: &'a str,
    pub schema: Value,
    pub prompt: String,
    /// Optional image attached to the prompt
    pub image: Option<&'a DataUri>,
}

/// Media returned by an image-capable model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMedia {
    /// A data URI for inline media, or a remote URL
    pub url: String,
}

/// Unified trait for generative-AI gateways
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Get the gateway name (e.g., "google", "openai")
    fn gateway_name(&self) -> &str;

    /// Run a schema-constrained generation.
    ///
    /// Returns `Ok(None)` when the model produced no output at all. The
    /// returned value is raw model output and must be decoded through
    /// [`crate::schema`] before use.
    async fn generate_structured(&self, request: StructuredRequest<'_>) -> Result<Option<Value>>;

    /// Run an image generation, returning `Ok(None)` if no media came back
    async fn generate_media(
        &self,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<Option<GeneratedMedia>>;
}

/// Parse the JSON text a model produced, tolerating a Markdown code fence around it
pub(crate) fn parse_model_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim()).map_err(|e| {
        SuggestError::SchemaValidation(format!("model output is not valid JSON: {}", e))
    })
}
