//! API Models
//!
//! Request and response bodies for the HTTP API, annotated for OpenAPI
//! generation with `utoipa`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/chat`.
///
/// The field is optional here so that a missing message is reported through
/// the same validation error as an empty one. The published schema still
/// lists it as a required, non-null string.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatPayload {
    #[schema(
        example = "What is Newton's law?",
        min_length = 1,
        required = true,
        nullable = false
    )]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub response: String,
}

/// Body of `POST /api/tts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TtsPayload {
    #[schema(
        example = "Force equals mass times acceleration.",
        min_length = 1,
        required = true,
        nullable = false
    )]
    pub text: Option<String>,
}

/// Field-level cause of a validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Returns the field's text, or the field-level cause when it is missing or empty.
fn require_text(field: &str, value: Option<String>, empty_message: &str) -> Result<String, FieldError> {
    match value {
        None => Err(FieldError::new(field, "Required")),
        Some(v) if v.is_empty() => Err(FieldError::new(field, empty_message)),
        Some(v) => Ok(v),
    }
}

impl ChatPayload {
    pub fn validate(self) -> Result<String, FieldError> {
        require_text("message", self.message, "Message cannot be empty")
    }
}

impl TtsPayload {
    pub fn validate(self) -> Result<String, FieldError> {
        require_text("text", self.text, "Text cannot be empty")
    }
}
