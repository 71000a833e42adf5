//! Terminal rendering of conversation updates.

use tutor_core::{AvatarStatus, ConversationUpdate, Message, Role};

pub fn message_line(message: &Message) -> String {
    let speaker = match message.role() {
        Role::User => "you",
        Role::Assistant => "tutor",
    };
    format!("[{}] {}: {}", message.timestamp(), speaker, message.content())
}

pub fn status_line(status: AvatarStatus) -> String {
    format!("  ({})", status.label())
}

pub fn update_line(update: &ConversationUpdate) -> String {
    match update {
        ConversationUpdate::Status(status) => status_line(*status),
        ConversationUpdate::Message(message) => message_line(message),
    }
}
