//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event, Message, LOCAL_WELCOME};
use crate::gateway::ChatExchange;
use thiserror::Error;

/// Bot reply used when a send fails without a server detail
pub const GENERIC_FAILURE: &str = "Sorry, I encountered an error. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Rejected events. Every one of these leaves the state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Conversation already initialized")]
    AlreadyInitialized,
    #[error("Conversation is still loading")]
    NotReady,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Waiting for a reply to the previous message")]
    AwaitingReply,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Initialization
        // ============================================================
        (ConvState::Initializing { loading: false }, Event::Initialize) => Ok(
            TransitionResult::new(ConvState::Initializing { loading: true }).with_effect(
                Effect::LoadInitialData {
                    history_limit: context.history_limit,
                },
            ),
        ),

        (_, Event::Initialize) => Err(TransitionError::AlreadyInitialized),

        // Partial failure still ends in Ready with at least the greeting
        (
            ConvState::Initializing { loading: true },
            Event::InitialDataLoaded {
                welcome,
                history,
                at,
            },
        ) => {
            let greeting = welcome
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| LOCAL_WELCOME.to_string());

            Ok(TransitionResult::new(ConvState::Ready)
                .with_effect(Effect::AppendMessage(Message::bot(greeting, at)))
                .with_effects(
                    expand_history(history.unwrap_or_default())
                        .into_iter()
                        .map(Effect::AppendMessage),
                ))
        }

        // ============================================================
        // User turns
        // ============================================================
        (_, Event::UserSubmit { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        (ConvState::Ready, Event::UserSubmit { text, at }) => Ok(TransitionResult::new(
            ConvState::Pending,
        )
        .with_effect(Effect::AppendMessage(Message::user(text.clone(), at)))
        .with_effect(Effect::SendMessage { text })),

        (ConvState::Pending, Event::UserSubmit { .. }) => Err(TransitionError::AwaitingReply),

        (ConvState::Initializing { .. }, Event::UserSubmit { .. }) => {
            Err(TransitionError::NotReady)
        }

        (ConvState::Pending, Event::ReplyReceived { text, timestamp }) => {
            Ok(TransitionResult::new(ConvState::Ready)
                .with_effect(Effect::AppendMessage(Message::bot(text, timestamp))))
        }

        // A failed turn still resolves with a visible bot message
        (ConvState::Pending, Event::ReplyFailed { detail, at }) => {
            let text = detail
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            Ok(TransitionResult::new(ConvState::Ready)
                .with_effect(Effect::AppendMessage(Message::bot(text, at))))
        }

        // ============================================================
        // Default: invalid transition
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}

/// Expand newest-first exchanges into chronological user/bot pairs
pub fn expand_history(exchanges: Vec<ChatExchange>) -> Vec<Message> {
    exchanges
        .into_iter()
        .rev()
        .flat_map(|exchange| {
            [
                Message::user(exchange.user_text, exchange.timestamp),
                Message::bot(exchange.bot_text, exchange.timestamp),
            ]
        })
        .collect()
}
