use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::{Result, SuggestError};
use crate::model::{IngredientPhoto, SuggestionResult};
use crate::orchestrator::SuggestionOrchestrator;
use crate::providers::{GatewayFactory, ModelGateway};

/// Where the ingredients photo comes from
#[derive(Debug, Clone)]
pub enum PhotoSource {
    /// Image file on disk
    Path(PathBuf),
    /// `data:image/...;base64,...` string, e.g. from a browser upload
    DataUri(String),
}

/// Supported AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    OpenAI,
}

impl Provider {
    /// Convert to provider name string used by the factory
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAI => "openai",
        }
    }
}

/// Builder for configuring and running a recipe suggestion
#[derive(Default)]
pub struct RecipeSuggesterBuilder {
    photo: Option<PhotoSource>,
    provider: Option<Provider>,
    gateway: Option<Arc<dyn ModelGateway>>,
    api_key: Option<String>,
    model: Option<String>,
    image_model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    min_recipes: Option<u32>,
    max_photo_bytes: Option<usize>,
}

impl RecipeSuggesterBuilder {
    /// Read the ingredients photo from a file
    ///
    /// # Example
    /// ```
    /// use recipe_snap::RecipeSuggester;
    ///
    /// let builder = RecipeSuggester::builder()
    ///     .photo_path("/path/to/fridge.jpg");
    /// ```
    pub fn photo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.photo = Some(PhotoSource::Path(path.into()));
        self
    }

    /// Use an ingredients photo that is already encoded as a data URI
    ///
    /// # Example
    /// ```
    /// use recipe_snap::RecipeSuggester;
    ///
    /// let builder = RecipeSuggester::builder()
    ///     .photo_data_uri("data:image/jpeg;base64,/9j/4AAQSkZJRg==");
    /// ```
    pub fn photo_data_uri(mut self, data_uri: impl Into<String>) -> Self {
        self.photo = Some(PhotoSource::DataUri(data_uri.into()));
        self
    }

    /// Set the AI provider
    ///
    /// # Example
    /// ```
    /// use recipe_snap::{Provider, RecipeSuggester};
    ///
    /// let builder = RecipeSuggester::builder()
    ///     .photo_path("/path/to/fridge.jpg")
    ///     .provider(Provider::OpenAI);
    /// ```
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use an already constructed gateway instead of one built from configuration
    pub fn gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the API key for the provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model used for recipe generation
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the model used for recipe illustrations
    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    #[doc(hidden)]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Give up on the whole suggestion after this long
    ///
    /// # Example
    /// ```
    /// use recipe_snap::RecipeSuggester;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeSuggester::builder()
    ///     .photo_path("/path/to/fridge.jpg")
    ///     .timeout(Duration::from_secs(90));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Minimum number of recipes to ask for
    pub fn min_recipes(mut self, count: u32) -> Self {
        self.min_recipes = Some(count);
        self
    }

    /// Reject photos larger than this many bytes
    pub fn max_photo_bytes(mut self, limit: usize) -> Self {
        self.max_photo_bytes = Some(limit);
        self
    }

    /// Build and run the suggestion pipeline
    ///
    /// # Errors
    /// Returns `SuggestError` if:
    /// - No photo was specified, or it is not a valid image
    /// - The photo exceeds the size limit
    /// - No gateway can be created from the configuration
    /// - Recipe generation fails
    /// - The timeout elapses
    ///
    /// Failed illustrations are not errors; those recipes come back without an image.
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_snap::RecipeSuggester;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let result = RecipeSuggester::builder()
    ///     .photo_path("/path/to/fridge.jpg")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<SuggestionResult> {
        let source = self.photo.clone().ok_or_else(|| {
            SuggestError::Builder(
                "No photo specified. Use .photo_path() or .photo_data_uri()".to_string(),
            )
        })?;

        let config = self.resolve_config()?;
        let max_photo_bytes = self
            .max_photo_bytes
            .unwrap_or(config.suggestions.max_photo_bytes);
        let min_recipes = self.min_recipes.unwrap_or(config.suggestions.min_recipes);

        let photo = match source {
            PhotoSource::Path(path) => {
                // Reject oversized files from their metadata, before reading them
                let size = tokio::fs::metadata(&path).await?.len();
                let size = usize::try_from(size).unwrap_or(usize::MAX);
                if size > max_photo_bytes {
                    return Err(SuggestError::PhotoTooLarge {
                        size,
                        limit: max_photo_bytes,
                    });
                }
                IngredientPhoto::from_file(&path).await?
            }
            PhotoSource::DataUri(uri) => IngredientPhoto::from_data_uri(&uri)?,
        };
        photo.ensure_within(max_photo_bytes)?;

        let gateway = self.gateway_from(&config)?;
        let orchestrator = SuggestionOrchestrator::new(gateway).with_min_recipes(min_recipes);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, orchestrator.suggest(&photo))
                .await
                .map_err(|_| SuggestError::Timeout(limit))?,
            None => orchestrator.suggest(&photo).await,
        }
    }

    /// Build only the gateway, for callers that run individual pipeline steps
    pub fn build_gateway(&self) -> Result<Arc<dyn ModelGateway>> {
        let config = self.resolve_config()?;
        self.gateway_from(&config)
    }

    fn gateway_from(&self, config: &AppConfig) -> Result<Arc<dyn ModelGateway>> {
        match &self.gateway {
            Some(gateway) => Ok(Arc::clone(gateway)),
            None => GatewayFactory::from_config(config),
        }
    }

    /// Merge loaded configuration with the builder's overrides
    fn resolve_config(&self) -> Result<AppConfig> {
        let has_overrides = self.gateway.is_some()
            || self.provider.is_some()
            || self.api_key.is_some()
            || self.model.is_some()
            || self.image_model.is_some()
            || self.base_url.is_some();

        let mut config = match AppConfig::load() {
            Ok(config) => config,
            Err(e) if has_overrides => {
                warn!("Ignoring unreadable configuration: {}", e);
                AppConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(provider) = self.provider {
            config.default_provider = provider.as_str().to_string();
        }

        let provider_name = config.default_provider.clone();
        let provider_config = config
            .providers
            .entry(provider_name.clone())
            .or_insert_with(|| {
                ProviderConfig::for_model(
                    GatewayFactory::default_model(&provider_name).unwrap_or_default(),
                )
            });

        if let Some(api_key) = &self.api_key {
            provider_config.api_key = Some(api_key.clone());
        }
        if let Some(model) = &self.model {
            provider_config.model = model.clone();
        }
        if let Some(image_model) = &self.image_model {
            provider_config.image_model = Some(image_model.clone());
        }
        if let Some(base_url) = &self.base_url {
            provider_config.base_url = Some(base_url.clone());
        }

        Ok(config)
    }
}

/// Main entry point for the builder API
pub struct RecipeSuggester;

impl RecipeSuggester {
    /// Creates a new builder for suggesting recipes
    ///
    /// # Example
    /// ```
    /// use recipe_snap::RecipeSuggester;
    ///
    /// let builder = RecipeSuggester::builder();
    /// ```
    pub fn builder() -> RecipeSuggesterBuilder {
        RecipeSuggesterBuilder::default()
    }
}
