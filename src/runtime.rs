//! Runtimes that drive the state machines
//!
//! Each runtime owns one machine. It reads events from an mpsc queue, applies the
//! pure transition, executes the resulting effects (gateway calls run on spawned
//! tasks and post their outcome back as events) and publishes an immutable
//! snapshot after every accepted transition.

mod assessment;
mod conversation;

pub use assessment::{AssessmentHandle, AssessmentRuntime};
pub use conversation::{ConversationHandle, ConversationRuntime, ConversationSnapshot};

use crate::assessment::ValidationError;
use crate::conversation::ConvContext;
use crate::gateway::{GatewayError, RemoteGateway};
use std::future::Future;
use thiserror::Error;

/// Queue depth for runtime events
const EVENT_BUFFER: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Runtime has stopped")]
    Stopped,
}

/// Staging can fail locally before the runtime sees anything
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Run a gateway call on its own task. A panic inside the call still yields an
/// outcome, so the machine always leaves its in-flight state.
async fn guarded<T, F>(operation: &'static str, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(operation, error = %e, "Gateway task did not complete");
            Err(GatewayError::network(format!("{operation} aborted: {e}")))
        }
    }
}

/// Spawn a conversation runtime on the current tokio runtime
pub fn spawn_conversation<G>(
    context: ConvContext,
    gateway: G,
) -> ConversationHandle
where
    G: RemoteGateway + 'static,
{
    let (runtime, handle) = ConversationRuntime::new(context, gateway);
    tokio::spawn(runtime.run());
    handle
}

/// Spawn an assessment runtime on the current tokio runtime
pub fn spawn_assessment<G>(gateway: G) -> AssessmentHandle
where
    G: RemoteGateway + 'static,
{
    let (runtime, handle) = AssessmentRuntime::new(gateway);
    tokio::spawn(runtime.run());
    handle
}
