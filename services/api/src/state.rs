//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the provider
//! gateways shared by all handlers.

use std::sync::Arc;
use tutor_core::{llm_client::LLMClient, speech::SpeechSynthesizer};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub llm_client: Arc<dyn LLMClient>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}
