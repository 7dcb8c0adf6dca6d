//! Effects produced by conversation transitions

use super::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append to the timeline
    AppendMessage(Message),

    /// Fetch the welcome greeting and recent history together
    LoadInitialData { history_limit: usize },

    /// Send one user message
    SendMessage { text: String },
}
