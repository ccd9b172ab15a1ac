use async_trait::async_trait;
use mockito::{Matcher, Server};
use recipe_snap::providers::{GeneratedMedia, Modality, StructuredRequest};
use recipe_snap::{ModelGateway, Provider, RecipeSuggester, SuggestError};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const PHOTO: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ==";

fn chat_completion_body(content: &Value) -> String {
    json!({
        "choices": [{
            "message": { "content": content.to_string() }
        }]
    })
    .to_string()
}

fn two_recipes() -> Value {
    json!({
        "recipes": [
            {
                "title": "Tomato Basil Pasta",
                "description": "A classic Italian pasta with fresh tomatoes and fragrant basil.",
                "ingredients": ["200 g spaghetti", "3 Roma tomatoes, diced", "8 basil leaves, torn"],
                "instructions": "Boil the spaghetti for 9 minutes.\nSimmer tomatoes for 5 minutes until saucy.\nToss with basil."
            },
            {
                "title": "Caprese Salad",
                "description": "Ripe tomatoes layered with creamy mozzarella.",
                "ingredients": ["2 tomatoes, sliced 1 cm thick", "125 g mozzarella, sliced"],
                "instructions": "Alternate tomato and mozzarella slices.\nDrizzle with olive oil and season."
            }
        ]
    })
}

/// Test Use Case 1: photo → illustrated recipes, one illustration failing
#[tokio::test]
async fn test_builder_openai_partial_illustration_failure() {
    let mut server = Server::new_async().await;
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(&two_recipes()))
        .expect(1)
        .create_async()
        .await;
    let pasta_image = server
        .mock("POST", "/v1/images/generations")
        .match_body(Matcher::Regex("Tomato Basil Pasta".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"b64_json": "iVBORw0KGgo="}]}"#)
        .expect(1)
        .create_async()
        .await;
    let salad_image = server
        .mock("POST", "/v1/images/generations")
        .match_body(Matcher::Regex("Caprese Salad".to_string()))
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "The server had an error"}}"#)
        .expect(1)
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_data_uri(PHOTO)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .build()
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.recipes[0].title, "Tomato Basil Pasta");
    assert_eq!(
        result.recipes[0].image_data_uri.as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
    assert_eq!(result.recipes[1].title, "Caprese Salad");
    assert!(result.recipes[1].image_data_uri.is_none());
    assert_eq!(result.recipes[0].steps().len(), 3);

    chat.assert_async().await;
    pasta_image.assert_async().await;
    salad_image.assert_async().await;
}

/// Test Use Case 2: the recipe call itself fails
#[tokio::test]
async fn test_builder_recipe_failure_is_fatal() {
    let mut server = Server::new_async().await;
    let _chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "You exceeded your current quota"}}"#)
        .create_async()
        .await;
    let images = server
        .mock("POST", "/v1/images/generations")
        .expect(0)
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_data_uri(PHOTO)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .build()
        .await;

    match result {
        Err(SuggestError::ModelInvocation(msg)) => assert!(msg.contains("quota")),
        other => panic!("Expected ModelInvocation, got {:?}", other),
    }
    images.assert_async().await;
}

/// Test Use Case 3: nothing recognisable in the photo
#[tokio::test]
async fn test_builder_no_recipes() {
    let mut server = Server::new_async().await;
    let _chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(&json!({ "recipes": [] })))
        .create_async()
        .await;
    let images = server
        .mock("POST", "/v1/images/generations")
        .expect(0)
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_data_uri(PHOTO)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .build()
        .await
        .unwrap();

    assert!(result.is_empty());
    images.assert_async().await;
}

#[tokio::test]
async fn test_builder_rejects_large_photo_before_calling_model() {
    let mut server = Server::new_async().await;
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_data_uri(PHOTO)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .max_photo_bytes(4)
        .build()
        .await;

    assert!(matches!(
        result,
        Err(SuggestError::PhotoTooLarge { limit: 4, .. })
    ));
    chat.assert_async().await;
}

/// A 200 reply that is not JSON is a failed call, not an empty result
#[tokio::test]
async fn test_builder_non_json_recipe_reply_is_fatal() {
    let mut server = Server::new_async().await;
    let _chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>gateway maintenance</html>")
        .create_async()
        .await;
    let images = server
        .mock("POST", "/v1/images/generations")
        .expect(0)
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_data_uri(PHOTO)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .build()
        .await;

    assert!(matches!(result, Err(SuggestError::ModelInvocation(_))));
    images.assert_async().await;
}

#[tokio::test]
async fn test_builder_rejects_large_photo_file_before_reading() {
    let path = std::env::temp_dir().join(format!("recipe-snap-large-{}.jpg", std::process::id()));
    std::fs::write(&path, vec![0xFFu8; 64]).unwrap();

    let mut server = Server::new_async().await;
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_path(&path)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .max_photo_bytes(16)
        .build()
        .await;
    std::fs::remove_file(&path).ok();

    match result {
        Err(SuggestError::PhotoTooLarge { size, limit }) => {
            assert_eq!(size, 64);
            assert_eq!(limit, 16);
        }
        other => panic!("Expected PhotoTooLarge, got {:?}", other),
    }
    chat.assert_async().await;
}

#[tokio::test]
async fn test_builder_rejects_non_image_photo() {
    let result = RecipeSuggester::builder()
        .photo_data_uri("data:application/pdf;base64,JVBERi0=")
        .provider(Provider::Google)
        .api_key("test-key")
        .build()
        .await;

    assert!(matches!(result, Err(SuggestError::InvalidPhoto(_))));
}

/// Gateway whose recipe call never finishes
struct StalledGateway;

#[async_trait]
impl ModelGateway for StalledGateway {
    fn gateway_name(&self) -> &str {
        "stalled"
    }

    async fn generate_structured(
        &self,
        _request: StructuredRequest<'_>,
    ) -> Result<Option<Value>, SuggestError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn generate_media(
        &self,
        _prompt: &str,
        _modalities: &[Modality],
    ) -> Result<Option<GeneratedMedia>, SuggestError> {
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn test_builder_timeout_wraps_whole_pipeline() {
    let result = RecipeSuggester::builder()
        .photo_data_uri(PHOTO)
        .gateway(Arc::new(StalledGateway))
        .timeout(Duration::from_secs(90))
        .build()
        .await;

    match result {
        Err(SuggestError::Timeout(limit)) => assert_eq!(limit, Duration::from_secs(90)),
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_builder_reads_photo_from_file() {
    let path = std::env::temp_dir().join(format!("recipe-snap-{}.png", std::process::id()));
    std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

    let mut server = Server::new_async().await;
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex(r#""url":"data:image/png;base64,iVBORw0KGgo=""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(&json!({ "recipes": [] })))
        .create_async()
        .await;

    let result = RecipeSuggester::builder()
        .photo_path(&path)
        .provider(Provider::OpenAI)
        .api_key("fake_api_key")
        .base_url(server.url())
        .build()
        .await;
    std::fs::remove_file(&path).ok();

    assert!(result.unwrap().is_empty());
    chat.assert_async().await;
}
