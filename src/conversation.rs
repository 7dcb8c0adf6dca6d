//! Conversation state machine
//!
//! Merges the welcome greeting, persisted history and live exchanges into one
//! append-only timeline. Implements the Elm Architecture pattern with pure
//! state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConvContext, ConvState, Message, Role, Timeline, LOCAL_WELCOME, QUICK_QUESTIONS};
pub use transition::{
    expand_history, transition, TransitionError, TransitionResult, GENERIC_FAILURE,
};
