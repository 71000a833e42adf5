//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{ChatPayload, ChatReply, ErrorResponse, FieldError, TtsPayload},
    state::AppState,
};

use axum::{Router, routing::post};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::chat, handlers::tts),
    components(schemas(ChatPayload, ChatReply, TtsPayload, ErrorResponse, FieldError)),
    tags(
        (name = "AI Tutor API", description = "Tutor replies and speech synthesis")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/tts", post(handlers::tts))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use tutor_core::{
        GatewayError,
        llm_client::LLMClient,
        speech::{GoogleCloudTts, SpeechSynthesizer, SynthesizedAudio},
    };

    /// Counts calls and answers with a fixed result.
    struct CountingLLM {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl LLMClient for CountingLLM {
        async fn generate_reply(&self, utterance: &str) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(GatewayError::Provider(message.clone())),
                None => Ok(format!("You asked: {}", utterance)),
            }
        }
    }

    struct FixedSpeech(&'static [u8]);

    #[async_trait]
    impl SpeechSynthesizer for FixedSpeech {
        async fn synthesize(&self, _text: &str) -> Result<SynthesizedAudio, GatewayError> {
            Ok(SynthesizedAudio::mpeg(self.0))
        }
    }

    fn app(llm: Arc<dyn LLMClient>, speech: Arc<dyn SpeechSynthesizer>) -> Router {
        create_router(Arc::new(AppState {
            llm_client: llm,
            speech,
        }))
    }

    fn counting_llm(fail_with: Option<&str>) -> Arc<CountingLLM> {
        Arc::new(CountingLLM {
            calls: AtomicUsize::new(0),
            fail_with: fail_with.map(str::to_string),
        })
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_reply() {
        let llm = counting_llm(None);
        let router = app(llm.clone(), Arc::new(FixedSpeech(b"ID3")));

        let response = router
            .oneshot(post_json("/api/chat", r#"{"message":"What is a mole?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["response"], "You asked: What is a mole?");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chat_empty_message_is_rejected_without_provider_call() {
        let llm = counting_llm(None);
        let router = app(llm.clone(), Arc::new(FixedSpeech(b"ID3")));

        let response = router
            .oneshot(post_json("/api/chat", r#"{"message":""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert_eq!(body["details"][0]["field"], "message");
        assert_eq!(body["details"][0]["message"], "Message cannot be empty");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_rejected() {
        let llm = counting_llm(None);
        let router = app(llm.clone(), Arc::new(FixedSpeech(b"ID3")));

        let response = router.oneshot(post_json("/api/chat", "{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["details"][0]["field"], "message");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_rejected() {
        let llm = counting_llm(None);
        let router = app(llm.clone(), Arc::new(FixedSpeech(b"ID3")));

        let response = router
            .oneshot(post_json("/api/chat", r#"{"message": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["details"][0]["field"], "body");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_provider_failure() {
        let llm = counting_llm(Some("Failed to generate response: upstream timeout"));
        let router = app(llm, Arc::new(FixedSpeech(b"ID3")));

        let response = router
            .oneshot(post_json("/api/chat", r#"{"message":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate response");
        assert_eq!(
            body["message"],
            "Failed to generate response: upstream timeout"
        );
    }

    #[tokio::test]
    async fn test_tts_content_length_matches_body() {
        let router = app(
            counting_llm(None),
            Arc::new(FixedSpeech(b"ID3\x04\x00fake-mp3-frames")),
        );

        let response = router
            .oneshot(post_json("/api/tts", r#"{"text":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let declared: usize = response.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(declared, body.len());
        assert_eq!(&body[..], b"ID3\x04\x00fake-mp3-frames");
    }

    #[tokio::test]
    async fn test_tts_empty_text_is_rejected() {
        let router = app(
            counting_llm(None),
            Arc::new(FixedSpeech(b"ID3")),
        );

        let response = router
            .oneshot(post_json("/api/tts", r#"{"text":""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["details"][0]["field"], "text");
        assert_eq!(body["details"][0]["message"], "Text cannot be empty");
    }

    #[tokio::test]
    async fn test_tts_missing_credential_is_configuration_error() {
        let router = app(
            counting_llm(None),
            Arc::new(GoogleCloudTts::new(None).with_api_base("http://127.0.0.1:9")),
        );

        let response = router
            .oneshot(post_json("/api/tts", r#"{"text":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate speech");
        assert_eq!(
            body["message"],
            "Google Cloud TTS API key not configured. Please set GOOGLE_CLOUD_TTS_API_KEY environment variable."
        );
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let router = app(
            counting_llm(None),
            Arc::new(FixedSpeech(b"ID3")),
        );

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/api/chat"]["post"].is_object());
        assert!(doc["paths"]["/api/tts"]["post"].is_object());

        for (schema, field) in [("ChatPayload", "message"), ("TtsPayload", "text")] {
            let schema = &doc["components"]["schemas"][schema];
            assert_eq!(schema["required"], serde_json::json!([field]));
            assert_eq!(schema["properties"][field]["type"], "string");
        }
    }
}
