//! Conversation state types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Greeting used when the server welcome cannot be fetched
pub const LOCAL_WELCOME: &str = "👋 Welcome to RAiCare AI Assistant! I can help you with personalized recommendations for managing RA. Please upload an X-ray first to get started.";

/// Suggestions offered before the user has said anything
pub const QUICK_QUESTIONS: [&str; 4] = [
    "What foods should I avoid?",
    "What exercises can I do?",
    "Tell me about lifestyle changes",
    "How can I manage pain?",
];

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// One displayed message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp,
        }
    }

    pub fn bot(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            timestamp,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only message sequence; insertion order is display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Quick questions are shown only while the greeting is alone
    pub fn quick_questions(&self) -> &'static [&'static str] {
        if self.messages.len() == 1 {
            &QUICK_QUESTIONS
        } else {
            &[]
        }
    }
}

/// Conversation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Before the timeline is seeded. `loading` is set once the initial
    /// requests are out.
    Initializing { loading: bool },

    /// Accepting user input
    Ready,

    /// One send request in flight
    Pending,
}

impl Default for ConvState {
    fn default() -> Self {
        ConvState::Initializing { loading: false }
    }
}

impl ConvState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConvState::Ready)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ConvState::Pending)
    }
}

/// Immutable per-conversation settings
#[derive(Debug, Clone)]
pub struct ConvContext {
    /// How many past exchanges seed the timeline
    pub history_limit: usize,
}

impl ConvContext {
    pub fn new(history_limit: usize) -> Self {
        Self { history_limit }
    }
}

impl Default for ConvContext {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CHAT_HISTORY_LIMIT)
    }
}
