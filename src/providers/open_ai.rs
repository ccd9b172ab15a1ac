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

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

pub struct OpenAIGateway {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIGateway {
    /// Create a new OpenAI gateway from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                SuggestError::Provider(
                    "OPENAI_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAIGateway {
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

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let response_body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(SuggestError::ModelInvocation(format!(
                    "OpenAI returned a non-JSON response: {}",
                    e
                )))
            }
            Err(_) => Value::Null,
        };

        if !status.is_success() || response_body.get("error").is_some() {
            let message = response_body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| response_body["error"].to_string());
            return Err(SuggestError::ModelInvocation(format!(
                "OpenAI API error ({}): {}",
                status, message
            )));
        }

        Ok(response_body)
    }
}

#[async_trait]
impl ModelGateway for OpenAIGateway {
    fn gateway_name(&self) -> &str {
        "openai"
    }

    async fn generate_structured(&self, request: StructuredRequest<'_>) -> Result<Option<Value>> {
        let mut content = vec![json!({ "type": "text", "text": request.prompt })];
        if let Some(image) = request.image {
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": image.as_str() }
            }));
        }

        let response_body = self
            .post(
                "/v1/chat/completions",
                json!({
                    "model": self.model,
                    "messages": [{ "role": "user", "content": content }],
                    "response_format": {
                        "type": "json_schema",
                        "json_schema": {
                            "name": request.schema_name,
                            "strict": true,
                            "schema": request.schema
                        }
                    },
                    "temperature": self.temperature,
                    "max_tokens": self.max_tokens
                }),
            )
            .await?;
        debug!("OpenAI {} response: {:?}", request.schema_name, response_body);

        let message = &response_body["choices"][0]["message"];
        if let Some(refusal) = message["refusal"].as_str() {
            return Err(SuggestError::ModelInvocation(format!(
                "OpenAI refused the request: {}",
                refusal
            )));
        }

        match message["content"].as_str() {
            Some(text) if !text.trim().is_empty() => parse_model_json(text).map(Some),
            _ => Ok(None),
        }
    }

    async fn generate_media(
        &self,
        prompt: &str,
        modalities: &[Modality],
    ) -> Result<Option<GeneratedMedia>> {
        if modalities.contains(&Modality::Text) {
            debug!("OpenAI image endpoint returns images only, ignoring TEXT modality");
        }

        let mut body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024"
        });
        // DALL-E models return URLs unless asked otherwise; gpt-image models always return base64
        if self.image_model.starts_with("dall-e") {
            body["response_format"] = json!("b64_json");
        }

        let response_body = self.post("/v1/images/generations", body).await?;

        let image = &response_body["data"][0];
        let media = if let Some(data) = image["b64_json"].as_str().filter(|d| !d.is_empty()) {
            Some(GeneratedMedia {
                url: format!("data:image/png;base64,{}", data),
            })
        } else {
            image["url"].as_str().map(|url| GeneratedMedia {
                url: url.to_string(),
            })
        };

        Ok(media)
    }
}
