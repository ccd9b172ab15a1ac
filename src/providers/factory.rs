use crate::config::{AppConfig, ProviderConfig};
use crate::error::{Result, SuggestError};
use crate::providers::{GoogleGateway, ModelGateway, OpenAIGateway};
use std::sync::Arc;
use std::time::Duration;

pub struct GatewayFactory;

impl GatewayFactory {
    /// Create a gateway instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Arc<dyn ModelGateway>> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(SuggestError::Provider(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "google" => Ok(Arc::new(GoogleGateway::new(config, timeout)?)),
            "openai" => Ok(Arc::new(OpenAIGateway::new(config, timeout)?)),
            _ => Err(SuggestError::Provider(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Get the default gateway from configuration
    pub fn from_config(config: &AppConfig) -> Result<Arc<dyn ModelGateway>> {
        let provider_name = &config.default_provider;
        let provider_config = config.default_provider_config().ok_or_else(|| {
            SuggestError::Provider(format!(
                "Default provider '{}' not found in configuration",
                provider_name
            ))
        })?;

        Self::create(
            provider_name,
            provider_config,
            Duration::from_secs(config.timeout),
        )
    }

    /// Default recipe model for a provider, used when no configuration names one
    pub fn default_model(provider_name: &str) -> Option<&'static str> {
        match provider_name {
            "google" => Some("gemini-2.0-flash"),
            "openai" => Some("gpt-4o-mini"),
            _ => None,
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["google", "openai"]
    }
}
