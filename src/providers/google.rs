use crate::config::ProviderConfig;
use crate::error::{Result, SuggestError};
use crate::providers::{
    parse_model_json, GeneratedMedia, Modality, ModelGateway, StructuredRequest,
};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
// Only the experimental flash model can return images.
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";

pub struct GoogleGateway {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleGateway {
    /// Create a new Google Gemini gateway from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                SuggestError::Provider(
                    "GOOGLE_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(GoogleGateway {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            image_model: config
                .image_model
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn generate_content(&self, model: &str, body: Value) -> Result<Value> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let response_body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(SuggestError::ModelInvocation(format!(
                    "Google Gemini returned a non-JSON response: {}",
                    e
                )))
            }
            Err(_) => Value::Null,
        };

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let error_code = error["code"].as_i64().unwrap_or(status.as_u16() as i64);
            let error_message = error["message"].as_str().unwrap_or("Unknown error");
            return Err(SuggestError::ModelInvocation(format!(
                "Google Gemini API error ({}): {}",
                error_code, error_message
            )));
        }
        if !status.is_success() {
            return Err(SuggestError::ModelInvocation(format!(
                "Google Gemini API error ({})",
                status
            )));
        }

        if let Some(reason) = response_body["promptFeedback"]["blockReason"].as_str() {
            return Err(SuggestError::ModelInvocation(format!(
                "Google Gemini blocked the prompt: {}",
                reason
            )));
        }

        Ok(response_body)
    }
}

/// Parts of the first candidate, empty when the model returned nothing
fn candidate_parts(response_body: &Value) -> Vec<Value> {
    response_body["candidates"][0]["content"]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// Gemini's `responseSchema` is an OpenAPI subset without `additionalProperties`
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| (key.clone(), to_gemini_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl ModelGateway for GoogleGateway {
    fn gateway_name(&self) -> &str {
        "google"
    }

    async fn generate_structured(&self, request: StructuredRequest<'_>) -> Result<Option<Value>> {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(image) = request.image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": image.mime_type(),
                    "data": image.base64_payload()
                }
            }));
        }

        let response_body = self
            .generate_content(
                &self.model,
                json!({
                    "contents": [{ "role": "user", "parts": parts }],
                    "generationConfig": {
                        "temperature": self.temperature,
                        "maxOutputTokens": self.max_tokens,
                        "responseMimeType": "application/json",
                        "responseSchema": to_gemini_schema(&request.schema)
                    }
                }),
            )
            .await?;
        debug!(
            "Google Gemini {} response: {:?}",
            request.schema_name, response_body
        );

        let text: String = candidate_parts(&response_body)
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();

        if text.trim().is_empty() {
            return Ok(None);
        }
        parse_model_json(&text).map(Some)
    }

    async fn generate_media(
        &self,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<Option<GeneratedMedia>> {
        let modalities: Vec<&str> = modalities.iter().map(Modality::as_str).collect();

        let response_body = self
            .generate_content(
                &self.image_model,
                json!({
                    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                    "generationConfig": {
                        "responseModalities": modalities
                    }
                }),
            )
            .await?;

        let media = candidate_parts(&response_body).iter().find_map(|part| {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
            let data = inline["data"].as_str().filter(|data| !data.is_empty())?;
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .unwrap_or("image/png");
            Some(GeneratedMedia {
                url: format!("data:{};base64,{}", mime_type, data),
            })
        });

        if media.is_none() {
            debug!("Google Gemini returned no inline media: {:?}", response_body);
        }
        Ok(media)
    }
}
