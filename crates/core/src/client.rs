//! HTTP client for the tutor's `/api/chat` and `/api/tts` endpoints.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsRequest {
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("server returned no audio")]
    EmptyAudio,
}

/// The two calls the orchestrator makes against the tutor service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TutorApi: Send + Sync {
    /// Sends a chat message and returns the tutor's reply.
    async fn chat(&self, message: &str) -> Result<String, ClientError>;

    /// Requests synthesized speech for `text`.
    async fn tts(&self, text: &str) -> Result<Bytes, ClientError>;
}

/// `TutorApi` over HTTP using `reqwest`.
#[derive(Clone)]
pub struct HttpTutorClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTutorClient {
    /// Creates a client whose requests fail once `timeout` has elapsed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, path, "Tutor service rejected request");
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl TutorApi for HttpTutorClient {
    async fn chat(&self, message: &str) -> Result<String, ClientError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        let reply: ChatResponse = self.post("/api/chat", &body).await?.json().await?;
        Ok(reply.response)
    }

    async fn tts(&self, text: &str) -> Result<Bytes, ClientError> {
        let body = TtsRequest {
            text: text.to_string(),
        };
        let audio = self.post("/api/tts", &body).await?.bytes().await?;
        if audio.is_empty() {
            return Err(ClientError::EmptyAudio);
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_chat_round_trip() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .json_body(json!({ "message": "What is Newton's law?" }));
                then.status(200)
                    .json_body(json!({ "response": "F = m·a" }));
            })
            .await;

        let client = HttpTutorClient::new(format!("{}/", server.base_url()), TIMEOUT).unwrap();
        let reply = client.chat("What is Newton's law?").await.unwrap();

        assert_eq!(reply, "F = m·a");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500).json_body(json!({
                    "error": "Failed to generate response",
                    "message": "boom"
                }));
            })
            .await;

        let client = HttpTutorClient::new(server.base_url(), TIMEOUT).unwrap();
        let err = client.chat("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(500)));
    }

    #[tokio::test]
    async fn test_tts_returns_bytes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/tts")
                    .json_body(json!({ "text": "hello" }));
                then.status(200)
                    .header("content-type", "audio/mpeg")
                    .body(b"ID3audio".to_vec());
            })
            .await;

        let client = HttpTutorClient::new(server.base_url(), TIMEOUT).unwrap();
        let audio = client.tts("hello").await.unwrap();
        assert_eq!(&audio[..], b"ID3audio");
    }

    #[tokio::test]
    async fn test_tts_empty_body_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/tts");
                then.status(200).header("content-type", "audio/mpeg");
            })
            .await;

        let client = HttpTutorClient::new(server.base_url(), TIMEOUT).unwrap();
        assert!(matches!(
            client.tts("hello").await.unwrap_err(),
            ClientError::EmptyAudio
        ));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = HttpTutorClient::new("http://127.0.0.1:9", TIMEOUT).unwrap();
        assert!(matches!(
            client.chat("hi").await.unwrap_err(),
            ClientError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({ "response": "late" }));
            })
            .await;

        let client = HttpTutorClient::new(server.base_url(), Duration::from_millis(100)).unwrap();
        match client.chat("hi").await.unwrap_err() {
            ClientError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
        mock.assert_hits_async(1).await;
    }
}
