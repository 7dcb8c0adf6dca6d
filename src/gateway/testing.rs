//! Mock gateway for testing
//!
//! Queued responses per operation, recorded calls, and an optional gate that
//! holds send/upload calls until the test releases them.

use super::{AssessmentResult, ChatExchange, ChatReply, GatewayError, RemoteGateway};
use crate::assessment::StagedFile;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

type Queue<T> = Mutex<VecDeque<Result<T, GatewayError>>>;

/// A call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Welcome,
    ChatHistory { limit: usize },
    SendMessage { text: String },
    ClearChatHistory,
    UploadAssessment { file_name: String },
    LatestAssessment,
    AssessmentHistory { limit: usize },
}

#[derive(Default)]
pub struct MockGateway {
    welcome: Queue<String>,
    history: Queue<Vec<ChatExchange>>,
    replies: Queue<ChatReply>,
    clears: Queue<u64>,
    uploads: Queue<AssessmentResult>,
    latest: Queue<Option<AssessmentResult>>,
    assessments: Queue<Vec<AssessmentResult>>,
    calls: Mutex<Vec<GatewayCall>>,
    held: AtomicBool,
    gate: Notify,
    panic_next: AtomicBool,
}

fn pop<T>(queue: &Queue<T>) -> Result<T, GatewayError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(GatewayError::network("No mock response queued")))
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_welcome(&self, response: Result<String, GatewayError>) {
        self.welcome.lock().unwrap().push_back(response);
    }

    pub fn queue_history(&self, response: Result<Vec<ChatExchange>, GatewayError>) {
        self.history.lock().unwrap().push_back(response);
    }

    pub fn queue_reply(&self, response: Result<ChatReply, GatewayError>) {
        self.replies.lock().unwrap().push_back(response);
    }

    pub fn queue_clear(&self, response: Result<u64, GatewayError>) {
        self.clears.lock().unwrap().push_back(response);
    }

    pub fn queue_upload(&self, response: Result<AssessmentResult, GatewayError>) {
        self.uploads.lock().unwrap().push_back(response);
    }

    pub fn queue_latest(&self, response: Result<Option<AssessmentResult>, GatewayError>) {
        self.latest.lock().unwrap().push_back(response);
    }

    pub fn queue_assessments(&self, response: Result<Vec<AssessmentResult>, GatewayError>) {
        self.assessments.lock().unwrap().push_back(response);
    }

    /// Hold send and upload calls until [`release`](Self::release)
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let one held call proceed
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// The next send or upload panics instead of returning
    pub fn panic_on_next_call(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub fn recorded_calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn send_count(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::SendMessage { .. }))
    }

    pub fn upload_count(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::UploadAssessment { .. }))
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn gated(&self) {
        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        assert!(
            !self.panic_next.swap(false, Ordering::SeqCst),
            "mock gateway panic"
        );
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn welcome(&self) -> Result<String, GatewayError> {
        self.record(GatewayCall::Welcome);
        pop(&self.welcome)
    }

    async fn chat_history(&self, limit: usize) -> Result<Vec<ChatExchange>, GatewayError> {
        self.record(GatewayCall::ChatHistory { limit });
        pop(&self.history)
    }

    async fn send_message(&self, text: &str) -> Result<ChatReply, GatewayError> {
        self.record(GatewayCall::SendMessage {
            text: text.to_string(),
        });
        self.gated().await;
        pop(&self.replies)
    }

    async fn clear_chat_history(&self) -> Result<u64, GatewayError> {
        self.record(GatewayCall::ClearChatHistory);
        pop(&self.clears)
    }

    async fn upload_assessment(&self, file: &StagedFile) -> Result<AssessmentResult, GatewayError> {
        self.record(GatewayCall::UploadAssessment {
            file_name: file.file_name().to_string(),
        });
        self.gated().await;
        pop(&self.uploads)
    }

    async fn latest_assessment(&self) -> Result<Option<AssessmentResult>, GatewayError> {
        self.record(GatewayCall::LatestAssessment);
        pop(&self.latest)
    }

    async fn assessment_history(&self, limit: usize) -> Result<Vec<AssessmentResult>, GatewayError> {
        self.record(GatewayCall::AssessmentHistory { limit });
        pop(&self.assessments)
    }
}
