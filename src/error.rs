use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while suggesting and illustrating recipes
#[derive(Error, Debug)]
pub enum SuggestError {
    /// Gateway output did not match the expected shape
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// Gateway call failed, timed out, or returned no usable payload
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// The ingredient photo is not a well-formed image data URI
    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    /// The photo exceeds the upload size policy
    #[error("Photo is too large ({size} bytes, limit is {limit} bytes)")]
    PhotoTooLarge { size: usize, limit: usize },

    /// A pipeline step received input it cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A gateway could not be created from its configuration
    #[error("Provider error: {0}")]
    Provider(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// The caller-level timeout elapsed before the pipeline finished
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Failed to read a photo from disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SuggestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SuggestError::ModelInvocation(format!("request timed out: {}", err))
        } else {
            SuggestError::ModelInvocation(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SuggestError>;
