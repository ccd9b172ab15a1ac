use crate::error::{Result, SuggestError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A self-contained `data:<mime>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    uri: String,
    mime_type: String,
    payload_start: usize,
}

impl DataUri {
    /// Parse and validate a base64 data URI
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        let trimmed = value.trim();
        let rest = trimmed
            .strip_prefix("data:")
            .ok_or("data URI must start with 'data:'")?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or("data URI is missing the ',' payload separator")?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or("data URI must use base64 encoding")?
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime_type.is_empty() || !mime_type.contains('/') {
            return Err(format!("data URI has an invalid MIME type '{}'", mime_type));
        }
        if payload.is_empty() {
            return Err("data URI payload is empty".to_string());
        }
        STANDARD
            .decode(payload)
            .map_err(|e| format!("data URI payload is not valid base64: {}", e))?;

        Ok(DataUri {
            uri: trimmed.to_string(),
            mime_type,
            payload_start: trimmed.len() - payload.len(),
        })
    }

    /// Build a data URI from raw bytes
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        let prefix = format!("data:{};base64,", mime_type);
        let payload_start = prefix.len();
        DataUri {
            uri: format!("{}{}", prefix, STANDARD.encode(bytes)),
            mime_type: mime_type.to_ascii_lowercase(),
            payload_start,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The base64 payload without the `data:` header
    pub fn base64_payload(&self) -> &str {
        &self.uri[self.payload_start..]
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn into_string(self) -> String {
        self.uri
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Photo of ingredients supplied by the caller
#[derive(Debug, Clone)]
pub struct IngredientPhoto(DataUri);

impl IngredientPhoto {
    /// Validate a photo given as a data URI
    pub fn from_data_uri(value: &str) -> Result<Self> {
        let uri = DataUri::parse(value).map_err(SuggestError::InvalidPhoto)?;
        if !uri.is_image() {
            return Err(SuggestError::InvalidPhoto(format!(
                "expected an image MIME type, got '{}'",
                uri.mime_type()
            )));
        }
        Ok(IngredientPhoto(uri))
    }

    /// Read a photo from disk, guessing the MIME type from the file extension
    pub async fn from_file(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for_path(path).ok_or_else(|| {
            SuggestError::InvalidPhoto(format!(
                "unsupported image file extension: {}",
                path.display()
            ))
        })?;
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(SuggestError::InvalidPhoto(format!(
                "{} is empty",
                path.display()
            )));
        }
        Ok(IngredientPhoto(DataUri::from_bytes(&bytes, mime_type)))
    }

    /// Decoded size of the image in bytes
    pub fn byte_len(&self) -> usize {
        let payload = self.0.base64_payload().trim_end_matches('=');
        payload.len() * 3 / 4
    }

    /// Enforce an upload size limit
    pub fn ensure_within(&self, limit: usize) -> Result<()> {
        let size = self.byte_len();
        if size > limit {
            return Err(SuggestError::PhotoTooLarge { size, limit });
        }
        Ok(())
    }

    pub fn data_uri(&self) -> &DataUri {
        &self.0
    }
}

fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// A recipe proposed by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSuggestion {
    pub title: String,
    pub description: String,
    /// Quantity and preparation specific lines, e.g. "1 cup diced Roma tomatoes"
    pub ingredients: Vec<String>,
    /// Step-by-step instructions, possibly spanning several lines
    pub instructions: String,
    /// Only present when the illustration for this recipe succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
}

impl RecipeSuggestion {
    pub fn has_image(&self) -> bool {
        self.image_data_uri.is_some()
    }

    /// Instructions split into non-empty steps
    pub fn steps(&self) -> Vec<&str> {
        self.instructions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Outcome of one suggestion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub recipes: Vec<RecipeSuggestion>,
}

impl SuggestionResult {
    /// No recipes found; a valid result rather than an error
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }
}

/// Creative ideas for improving a set of recipe suggestions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImprovements {
    pub improved_recipe_ideas: Vec<String>,
}
