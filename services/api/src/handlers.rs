//! Axum Handlers for the REST API
//!
//! Both endpoints validate their input, delegate to one provider gateway and
//! translate gateway failures into JSON error bodies. They are stateless and
//! independent of each other.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, instrument};
use tutor_core::GatewayError;

use crate::{
    models::{ChatPayload, ChatReply, ErrorResponse, FieldError, TtsPayload},
    state::AppState,
};

pub enum ApiError {
    Validation(Vec<FieldError>),
    Gateway {
        error: &'static str,
        source: GatewayError,
    },
}

impl ApiError {
    fn invalid(cause: FieldError) -> Self {
        ApiError::Validation(vec![cause])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid request".to_string(),
                    message: None,
                    details: Some(details),
                }),
            )
                .into_response(),
            ApiError::Gateway { error, source } => {
                error!(error = %source, configuration = source.is_configuration(), "{}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: error.to_string(),
                        message: Some(source.to_string()),
                        details: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid(FieldError::new("body", rejection.body_text()))
    }
}

/// Generate the tutor's reply to a student message.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Tutor reply", body = ChatReply),
        (status = 400, description = "Missing or empty message", body = ErrorResponse),
        (status = 500, description = "Reply generation failed", body = ErrorResponse)
    )
)]
#[instrument(name = "chat", skip_all)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(payload) = payload?;
    let message = payload.validate().map_err(ApiError::invalid)?;

    let response = state
        .llm_client
        .generate_reply(&message)
        .await
        .map_err(|source| ApiError::Gateway {
            error: "Failed to generate response",
            source,
        })?;

    info!(reply_chars = response.chars().count(), "Reply generated");
    Ok(Json(ChatReply { response }))
}

/// Synthesize speech for a piece of text.
#[utoipa::path(
    post,
    path = "/api/tts",
    request_body = TtsPayload,
    responses(
        (status = 200, description = "MP3 encoded speech", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Missing or empty text", body = ErrorResponse),
        (status = 500, description = "Speech synthesis failed or is not configured", body = ErrorResponse)
    )
)]
#[instrument(name = "tts", skip_all)]
pub async fn tts(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TtsPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let text = payload.validate().map_err(ApiError::invalid)?;

    let audio = state
        .speech
        .synthesize(&text)
        .await
        .map_err(|source| ApiError::Gateway {
            error: "Failed to generate speech",
            source,
        })?;

    info!(bytes = audio.len(), "Speech generated");
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(audio.mime_type)),
        (header::CONTENT_LENGTH, HeaderValue::from(audio.len())),
    ];
    Ok((StatusCode::OK, headers, audio.data).into_response())
}
