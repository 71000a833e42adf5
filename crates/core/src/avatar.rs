//! Avatar Status State Machine
//!
//! The avatar shown next to the chat reflects what the tutor is doing. Every
//! status change goes through [`AvatarStatus::apply`], which encodes the full
//! transition table:
//!
//! - `Idle` --Submitted--> `Thinking`
//! - `Thinking` --ReplyReceived--> `Speaking`
//! - `Thinking` --ChatFailed--> `Idle`
//! - `Speaking` --PlaybackEnded--> `Idle`
//! - `Speaking` --FallbackElapsed--> `Idle`
//! - `Thinking` | `Speaking` --Abandoned--> `Idle`
//!
//! `Listening` is reserved for voice input and no event leads into it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStatus {
    #[default]
    Idle,
    Listening,
    Thinking,
    Speaking,
}

/// Something that happened during a conversation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarEvent {
    /// The user submitted a message.
    Submitted,
    /// The tutor's reply arrived.
    ReplyReceived,
    /// The chat request failed.
    ChatFailed,
    /// Audio playback of the reply finished.
    PlaybackEnded,
    /// The fallback hold elapsed without audio.
    FallbackElapsed,
    /// The cycle was dropped before it finished.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid avatar transition: {event:?} while {from}")]
pub struct InvalidTransition {
    pub from: AvatarStatus,
    pub event: AvatarEvent,
}

impl AvatarStatus {
    /// Computes the status that follows `event`.
    pub fn apply(self, event: AvatarEvent) -> Result<AvatarStatus, InvalidTransition> {
        use AvatarEvent::*;
        use AvatarStatus::*;

        match (self, event) {
            (Idle, Submitted) => Ok(Thinking),
            (Thinking, ReplyReceived) => Ok(Speaking),
            (Thinking, ChatFailed) => Ok(Idle),
            (Speaking, PlaybackEnded) | (Speaking, FallbackElapsed) => Ok(Idle),
            (Thinking, Abandoned) | (Speaking, Abandoned) => Ok(Idle),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    /// A new submission is refused while the tutor is busy.
    pub fn is_busy(&self) -> bool {
        matches!(self, AvatarStatus::Thinking | AvatarStatus::Speaking)
    }

    /// Human readable label for the status indicator.
    pub fn label(&self) -> &'static str {
        match self {
            AvatarStatus::Idle => "Ready to help",
            AvatarStatus::Listening => "Listening...",
            AvatarStatus::Thinking => "Thinking...",
            AvatarStatus::Speaking => "Speaking...",
        }
    }
}

impl fmt::Display for AvatarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvatarStatus::Idle => write!(f, "idle"),
            AvatarStatus::Listening => write!(f, "listening"),
            AvatarStatus::Thinking => write!(f, "thinking"),
            AvatarStatus::Speaking => write!(f, "speaking"),
        }
    }
}
