//! Remote gateway abstraction
//!
//! Every network call the controllers make goes through [`RemoteGateway`].
//! Transport details (base URL, headers, bearer token) stay behind the trait.

mod error;
mod http;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpGateway;
pub use types::{parse_timestamp, AssessmentResult, ChatExchange, ChatReply, Envelope};

use crate::assessment::StagedFile;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Network operations consumed by the controllers
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Greeting for a fresh chat session
    async fn welcome(&self) -> Result<String, GatewayError>;

    /// Most recent exchanges, newest first
    async fn chat_history(&self, limit: usize) -> Result<Vec<ChatExchange>, GatewayError>;

    /// Send one user message and wait for the bot reply
    async fn send_message(&self, text: &str) -> Result<ChatReply, GatewayError>;

    /// Delete every persisted exchange, returning how many were removed
    async fn clear_chat_history(&self) -> Result<u64, GatewayError>;

    /// Upload an X-ray and run the assessment
    async fn upload_assessment(&self, file: &StagedFile) -> Result<AssessmentResult, GatewayError>;

    /// Latest assessment; `None` when the user has none yet
    async fn latest_assessment(&self) -> Result<Option<AssessmentResult>, GatewayError>;

    /// Past assessments, newest first
    async fn assessment_history(&self, limit: usize) -> Result<Vec<AssessmentResult>, GatewayError>;
}

#[async_trait]
impl<T: RemoteGateway + ?Sized> RemoteGateway for Arc<T> {
    async fn welcome(&self) -> Result<String, GatewayError> {
        (**self).welcome().await
    }

    async fn chat_history(&self, limit: usize) -> Result<Vec<ChatExchange>, GatewayError> {
        (**self).chat_history(limit).await
    }

    async fn send_message(&self, text: &str) -> Result<ChatReply, GatewayError> {
        (**self).send_message(text).await
    }

    async fn clear_chat_history(&self) -> Result<u64, GatewayError> {
        (**self).clear_chat_history().await
    }

    async fn upload_assessment(&self, file: &StagedFile) -> Result<AssessmentResult, GatewayError> {
        (**self).upload_assessment(file).await
    }

    async fn latest_assessment(&self) -> Result<Option<AssessmentResult>, GatewayError> {
        (**self).latest_assessment().await
    }

    async fn assessment_history(&self, limit: usize) -> Result<Vec<AssessmentResult>, GatewayError> {
        (**self).assessment_history(limit).await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn RemoteGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn RemoteGateway>) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(operation: &'static str, started: Instant, result: &Result<T, GatewayError>) {
    let duration_ms = started.elapsed().as_millis();
    match result {
        Ok(_) => {
            tracing::info!(operation, duration_ms = %duration_ms, "Gateway call completed");
        }
        Err(e) => {
            tracing::warn!(
                operation,
                duration_ms = %duration_ms,
                kind = ?e.kind,
                error = %e.message,
                "Gateway call failed"
            );
        }
    }
}

#[async_trait]
impl RemoteGateway for LoggingGateway {
    async fn welcome(&self) -> Result<String, GatewayError> {
        let started = Instant::now();
        let result = self.inner.welcome().await;
        log_outcome("welcome", started, &result);
        result
    }

    async fn chat_history(&self, limit: usize) -> Result<Vec<ChatExchange>, GatewayError> {
        let started = Instant::now();
        let result = self.inner.chat_history(limit).await;
        if let Ok(chats) = &result {
            tracing::debug!(limit, returned = chats.len(), "Chat history fetched");
        }
        log_outcome("chat_history", started, &result);
        result
    }

    async fn send_message(&self, text: &str) -> Result<ChatReply, GatewayError> {
        let started = Instant::now();
        let result = self.inner.send_message(text).await;
        log_outcome("send_message", started, &result);
        result
    }

    async fn clear_chat_history(&self) -> Result<u64, GatewayError> {
        let started = Instant::now();
        let result = self.inner.clear_chat_history().await;
        log_outcome("clear_chat_history", started, &result);
        result
    }

    async fn upload_assessment(&self, file: &StagedFile) -> Result<AssessmentResult, GatewayError> {
        let started = Instant::now();
        let result = self.inner.upload_assessment(file).await;
        tracing::debug!(
            file_name = %file.file_name(),
            size_bytes = file.len(),
            "Assessment upload finished"
        );
        log_outcome("upload_assessment", started, &result);
        result
    }

    async fn latest_assessment(&self) -> Result<Option<AssessmentResult>, GatewayError> {
        let started = Instant::now();
        let result = self.inner.latest_assessment().await;
        log_outcome("latest_assessment", started, &result);
        result
    }

    async fn assessment_history(&self, limit: usize) -> Result<Vec<AssessmentResult>, GatewayError> {
        let started = Instant::now();
        let result = self.inner.assessment_history(limit).await;
        log_outcome("assessment_history", started, &result);
        result
    }
}
