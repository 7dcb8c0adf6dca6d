//! Assessment runtime executor

use super::{guarded, RuntimeError, StageError, EVENT_BUFFER};
use crate::assessment::{transition, AssessmentState, Effect, Event, StagedFile};
use crate::gateway::RemoteGateway;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Handle to a running assessment workflow
#[derive(Clone)]
pub struct AssessmentHandle {
    event_tx: mpsc::Sender<Event>,
    state_rx: watch::Receiver<AssessmentState>,
    next_attempt: Arc<AtomicU64>,
}

impl AssessmentHandle {
    /// Validate and stage an in-memory file. Non-images are rejected here and
    /// never reach the runtime.
    pub async fn stage(
        &self,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Result<(), StageError> {
        let file = StagedFile::new(file_name, content_type, data)?;
        Ok(self.stage_file(file).await?)
    }

    /// Read, validate and stage a file from disk
    pub async fn stage_path(&self, path: impl AsRef<Path>) -> Result<(), StageError> {
        let file = StagedFile::from_path(path).await?;
        Ok(self.stage_file(file).await?)
    }

    /// Ignored while an upload is outstanding
    pub async fn stage_file(&self, file: StagedFile) -> Result<(), RuntimeError> {
        self.send(Event::Stage { file }).await
    }

    /// Upload the staged file. Ignored with nothing staged or while analyzing.
    pub async fn analyze(&self) -> Result<(), RuntimeError> {
        let attempt = self.next_attempt.fetch_add(1, Ordering::Relaxed);
        self.send(Event::Analyze { attempt }).await
    }

    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.send(Event::Reset).await
    }

    pub fn snapshot(&self) -> AssessmentState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AssessmentState> {
        self.state_rx.clone()
    }

    /// Wait until the published state satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl Fn(&AssessmentState) -> bool,
    ) -> Result<AssessmentState, RuntimeError> {
        let mut rx = self.state_rx.clone();
        let state = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        Ok(state.clone())
    }

    async fn send(&self, event: Event) -> Result<(), RuntimeError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped)
    }
}

/// Owns one assessment lifecycle
pub struct AssessmentRuntime<G: RemoteGateway + 'static> {
    state: AssessmentState,
    gateway: Arc<G>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::WeakSender<Event>,
    state_tx: watch::Sender<AssessmentState>,
}

impl<G: RemoteGateway + 'static> AssessmentRuntime<G> {
    pub fn new(gateway: G) -> (Self, AssessmentHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(AssessmentState::Idle);

        let runtime = Self {
            state: AssessmentState::Idle,
            gateway: Arc::new(gateway),
            event_rx,
            event_tx: event_tx.downgrade(),
            state_tx,
        };
        let handle = AssessmentHandle {
            event_tx,
            state_rx,
            next_attempt: Arc::new(AtomicU64::new(1)),
        };
        (runtime, handle)
    }

    pub async fn run(mut self) {
        tracing::info!("Starting assessment runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!(phase = ?self.state.phase(), "Assessment runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(phase = ?self.state.phase(), reason = %e, "Ignoring assessment event");
                return;
            }
        };

        if result.new_state.phase() != self.state.phase() {
            tracing::info!(
                from = ?self.state.phase(),
                to = ?result.new_state.phase(),
                "Assessment state changed"
            );
        }
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        self.state_tx.send_replace(self.state.clone());
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::Upload { file, attempt } => {
                let Some(event_tx) = self.event_tx.upgrade() else {
                    return;
                };
                let gateway = Arc::clone(&self.gateway);

                tracing::info!(
                    attempt,
                    file_name = %file.file_name(),
                    size_bytes = file.len(),
                    "Uploading X-ray for analysis"
                );

                tokio::spawn(async move {
                    let result = guarded("upload_assessment", async move {
                        gateway.upload_assessment(&file).await
                    })
                    .await;

                    let event = match result {
                        Ok(result) => Event::AnalysisSucceeded { attempt, result },
                        Err(e) => {
                            tracing::warn!(attempt, error = %e, kind = ?e.kind, "Analysis failed");
                            Event::AnalysisFailed {
                                attempt,
                                detail: e.user_detail().map(ToString::to_string),
                            }
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
            }
        }
    }
}
