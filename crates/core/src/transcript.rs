//! Conversation transcript.
//!
//! Messages are immutable once created and the transcript only ever grows.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry in the transcript.
///
/// Fields are private so a message cannot change after it has been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    timestamp: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self::at(role, content, Local::now())
    }

    /// Creates a message stamped with the given wall clock time.
    pub fn at(role: Role, content: impl Into<String>, time: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: display_time(&time),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Short clock time such as `3:07 PM`.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

fn display_time(time: &DateTime<Local>) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Insertion-ordered, append-only list of messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns a copy of it.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Message {
        let message = Message::new(role, content);
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.append(Role::User, "What is Newton's law?");
        transcript.append(Role::Assistant, "Force equals mass times acceleration.");

        let roles: Vec<Role> = transcript.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(
            transcript.last().map(|m| m.content()),
            Some("Force equals mass times acceleration.")
        );
    }

    #[test]
    fn test_message_ids_are_unique() {
        let mut transcript = Transcript::new();
        let a = transcript.append(Role::User, "one");
        let b = transcript.append(Role::User, "one");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_timestamp_format() {
        let afternoon = Local.with_ymd_and_hms(2024, 1, 15, 15, 7, 0).unwrap();
        let message = Message::at(Role::User, "hi", afternoon);
        assert_eq!(message.timestamp(), "3:07 PM");

        let morning = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let message = Message::at(Role::Assistant, "hello", morning);
        assert_eq!(message.timestamp(), "9:30 AM");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(format!("{}", Role::Assistant), "assistant");
    }

    #[test]
    fn test_message_serialization() {
        let message = Message::new(Role::User, "Solve: 2x + 5 = 15");
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("Solve: 2x + 5 = 15"));

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
