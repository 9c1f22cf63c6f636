//! Conversation transcript storage.
//!
//! Holds the messages shown in the chat view and replayed to the backend
//! as context. Uses a fixed-capacity ring buffer to prevent unbounded
//! growth; nothing is persisted across sessions.

use crate::backend::{ChatRole, ChatTurn};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use uuid::Uuid;

/// A displayed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: String,
    /// Who authored the message.
    pub role: ChatRole,
    /// Message text content.
    pub text: String,
    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,
    /// Whether the message originated from speech input.
    pub from_voice: bool,
}

impl ChatMessage {
    fn new(role: ChatRole, text: String, from_voice: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            timestamp: Utc::now(),
            from_voice,
        }
    }
}

/// Conversation transcript with fixed capacity.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    /// Messages in insertion order (oldest first).
    messages: VecDeque<ChatMessage>,
    /// Maximum number of messages to retain.
    max_messages: usize,
}

impl ConversationHistory {
    /// Create an empty history with the given capacity.
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages,
        }
    }

    /// Create a history seeded with the assistant greeting.
    #[must_use]
    pub fn with_greeting(max_messages: usize, greeting: &str) -> Self {
        let mut history = Self::new(max_messages);
        history.push_assistant(greeting);
        history
    }

    /// Record a user message, evicting the oldest entry if at capacity.
    pub fn push_user(&mut self, text: &str, from_voice: bool) -> ChatMessage {
        self.push(ChatMessage::new(ChatRole::User, text.to_owned(), from_voice))
    }

    /// Record an assistant message.
    pub fn push_assistant(&mut self, text: &str) -> ChatMessage {
        self.push(ChatMessage::new(ChatRole::Assistant, text.to_owned(), false))
    }

    fn push(&mut self, message: ChatMessage) -> ChatMessage {
        if self.messages.len() >= self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message.clone());
        message
    }

    /// All messages in chronological order.
    #[must_use]
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// The transcript as role/content turns for a backend request.
    #[must_use]
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                content: m.text.clone(),
            })
            .collect()
    }

    /// Number of messages stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
