//! Response Generation Gateway
//!
//! Turns a student's question into a tutor reply using any OpenAI-compatible
//! chat completions API (OpenAI itself, or Gemini's compatibility endpoint).

use crate::error::GatewayError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use tracing::{debug, error};

/// The persona every reply is generated with.
pub const TUTOR_SYSTEM_PROMPT: &str = "You are an expert AI tutor specializing in Math, Physics, Chemistry, and Biology.
Your role is to:
- Explain concepts clearly and concisely
- Use examples when helpful
- Break down complex topics into understandable steps
- Be encouraging and supportive
- When explaining formulas, use plain text notation (e.g., a² + b² = c²)
- Keep responses focused and educational";

/// Returned when the provider answers with no text at all.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

/// A client that can produce a tutor reply for a single utterance.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generates the tutor's reply to `utterance`.
    ///
    /// Never returns an empty string: an empty provider answer is replaced by
    /// [`EMPTY_REPLY_FALLBACK`].
    async fn generate_reply(&self, utterance: &str) -> Result<String, GatewayError>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o").
    ///
    /// Provider errors are returned after a single attempt. Retrying is left
    /// to the caller, so a failing provider surfaces as an error right away.
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Self {
            client: Client::with_config(config).with_backoff(no_retry),
            model,
            system_prompt: TUTOR_SYSTEM_PROMPT.to_string(),
        }
    }

    async fn complete(&self, utterance: &str) -> Result<CreateChatCompletionResponse, OpenAIError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.as_str())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(utterance)
                    .build()?
                    .into(),
            ])
            .build()?;

        self.client.chat().create(request).await
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn generate_reply(&self, utterance: &str) -> Result<String, GatewayError> {
        let response = self.complete(utterance).await.map_err(|e| {
            error!(error = %e, model = %self.model, "Error generating tutor response");
            GatewayError::Provider(format!("Failed to generate response: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        debug!(chars = text.chars().count(), "Tutor reply generated");

        if text.is_empty() {
            return Ok(EMPTY_REPLY_FALLBACK.to_string());
        }
        Ok(text)
    }
}
