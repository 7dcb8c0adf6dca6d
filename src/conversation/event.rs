//! Events that drive the conversation

use crate::gateway::ChatExchange;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Initialize,
    UserSubmit {
        text: String,
        at: DateTime<Utc>,
    },

    // Gateway events
    /// Both initial requests have settled; `None` marks a failed call
    InitialDataLoaded {
        welcome: Option<String>,
        history: Option<Vec<ChatExchange>>,
        at: DateTime<Utc>,
    },
    ReplyReceived {
        text: String,
        timestamp: DateTime<Utc>,
    },
    ReplyFailed {
        /// Server-supplied detail, if any
        detail: Option<String>,
        at: DateTime<Utc>,
    },
}
