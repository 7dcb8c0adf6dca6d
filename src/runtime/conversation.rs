//! Conversation runtime executor

use super::{guarded, RuntimeError, EVENT_BUFFER};
use crate::conversation::{
    transition, ConvContext, ConvState, Effect, Event, Message, Timeline,
};
use crate::gateway::RemoteGateway;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Immutable view published after every accepted transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub state: ConvState,
    pub timeline: Timeline,
}

impl ConversationSnapshot {
    pub fn messages(&self) -> &[Message] {
        self.timeline.messages()
    }

    pub fn quick_questions(&self) -> &'static [&'static str] {
        self.timeline.quick_questions()
    }

    /// True while a reply is outstanding
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }
}

/// Handle to a running conversation. Cheap to clone; the runtime stops once
/// every handle is dropped and no gateway call is outstanding.
#[derive(Clone)]
pub struct ConversationHandle {
    event_tx: mpsc::Sender<Event>,
    snapshot_rx: watch::Receiver<ConversationSnapshot>,
}

impl ConversationHandle {
    /// Load the greeting and recent history. Repeated calls are ignored.
    pub async fn initialize(&self) -> Result<(), RuntimeError> {
        self.send(Event::Initialize).await
    }

    /// Submit a user message. Blank text, or a submit while a reply is
    /// outstanding, is ignored.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Event::UserSubmit {
            text: text.into(),
            at: Utc::now(),
        })
        .await
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl Fn(&ConversationSnapshot) -> bool,
    ) -> Result<ConversationSnapshot, RuntimeError> {
        let mut rx = self.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        Ok(snapshot.clone())
    }

    async fn send(&self, event: Event) -> Result<(), RuntimeError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped)
    }
}

/// Owns the conversation state and timeline
pub struct ConversationRuntime<G: RemoteGateway + 'static> {
    context: ConvContext,
    state: ConvState,
    timeline: Timeline,
    gateway: Arc<G>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so that the loop ends when every handle is gone
    event_tx: mpsc::WeakSender<Event>,
    snapshot_tx: watch::Sender<ConversationSnapshot>,
}

impl<G: RemoteGateway + 'static> ConversationRuntime<G> {
    pub fn new(context: ConvContext, gateway: G) -> (Self, ConversationHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(ConversationSnapshot::default());

        let runtime = Self {
            context,
            state: ConvState::default(),
            timeline: Timeline::new(),
            gateway: Arc::new(gateway),
            event_rx,
            event_tx: event_tx.downgrade(),
            snapshot_tx,
        };
        let handle = ConversationHandle {
            event_tx,
            snapshot_rx,
        };
        (runtime, handle)
    }

    pub async fn run(mut self) {
        tracing::info!(
            history_limit = self.context.history_limit,
            "Starting conversation runtime"
        );

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!(
            messages = self.timeline.len(),
            "Conversation runtime stopped"
        );
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejected events are no-ops
                tracing::debug!(state = ?self.state, reason = %e, "Ignoring conversation event");
                return;
            }
        };

        if result.new_state != self.state {
            tracing::info!(from = ?self.state, to = ?result.new_state, "Conversation state changed");
        }
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        self.snapshot_tx.send_replace(ConversationSnapshot {
            state: self.state.clone(),
            timeline: self.timeline.clone(),
        });
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage(message) => {
                self.timeline.push(message);
            }

            Effect::LoadInitialData { history_limit } => {
                let Some(event_tx) = self.event_tx.upgrade() else {
                    return;
                };
                let welcome_gateway = Arc::clone(&self.gateway);
                let history_gateway = Arc::clone(&self.gateway);

                tokio::spawn(async move {
                    let (welcome, history) = tokio::join!(
                        guarded("welcome", async move { welcome_gateway.welcome().await }),
                        guarded("chat_history", async move {
                            history_gateway.chat_history(history_limit).await
                        }),
                    );

                    // Failures degrade to the local greeting / empty history
                    let welcome = welcome
                        .inspect_err(|e| {
                            tracing::warn!(error = %e, "Welcome unavailable, using local greeting");
                        })
                        .ok();
                    let history = history
                        .inspect_err(|e| tracing::warn!(error = %e, "Chat history unavailable"))
                        .ok();

                    let _ = event_tx
                        .send(Event::InitialDataLoaded {
                            welcome,
                            history,
                            at: Utc::now(),
                        })
                        .await;
                });
            }

            Effect::SendMessage { text } => {
                let Some(event_tx) = self.event_tx.upgrade() else {
                    return;
                };
                let gateway = Arc::clone(&self.gateway);

                tokio::spawn(async move {
                    let result =
                        guarded("send_message", async move { gateway.send_message(&text).await })
                            .await;

                    let event = match result {
                        Ok(reply) => Event::ReplyReceived {
                            text: reply.response,
                            timestamp: reply.timestamp,
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, kind = ?e.kind, "Chat send failed");
                            Event::ReplyFailed {
                                detail: e.user_detail().map(ToString::to_string),
                                at: Utc::now(),
                            }
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
            }
        }
    }
}
