use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Gateway to use when none is specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Suggestion pipeline settings
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model used for recipe generation (e.g., "gemini-2.0-flash", "gpt-4o-mini")
    pub model: String,
    /// Model used for recipe illustrations
    pub image_model: Option<String>,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Settings that shape the suggestion pipeline and its upload policy
#[derive(Debug, Deserialize, Clone)]
pub struct SuggestionConfig {
    /// Minimum number of recipes requested from the model
    #[serde(default = "default_min_recipes")]
    pub min_recipes: u32,
    /// Largest accepted photo, in bytes
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_recipes: default_min_recipes(),
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            timeout: default_timeout(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Provider configuration with default settings for the given model
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            image_model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_min_recipes() -> u32 {
    6
}

fn default_max_photo_bytes() -> usize {
    5 * 1024 * 1024
}

// Image generation can take well over the usual 30 seconds.
fn default_timeout() -> u64 {
    120
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_SNAP__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_SNAP__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Look up the configuration of the default provider
    pub fn default_provider_config(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.default_provider)
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the lookup order.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_SNAP__PROVIDERS__GOOGLE__API_KEY
        .add_source(
            Environment::with_prefix("RECIPE_SNAP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
