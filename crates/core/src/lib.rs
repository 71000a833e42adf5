//! Tutor Core Library
//!
//! Provider gateways used by the tutor service, and the client-side
//! conversation orchestrator that drives the avatar status and transcript.

pub mod avatar;
pub mod client;
pub mod error;
pub mod llm_client;
pub mod orchestrator;
pub mod playback;
pub mod speech;
pub mod transcript;

pub use avatar::{AvatarEvent, AvatarStatus};
pub use error::GatewayError;
pub use orchestrator::{ConversationOrchestrator, ConversationUpdate, CycleOutcome};
pub use transcript::{Message, Role, Transcript};
