//! Gateway error types

use thiserror::Error;

/// Gateway error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    /// Human-readable detail supplied by the server, if any
    pub detail: Option<String>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::ServerError, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Decode, message)
    }

    /// A 2xx response whose envelope did not report success.
    ///
    /// The envelope message is for logs only and never becomes user detail.
    pub fn rejected(server_message: Option<&str>) -> Self {
        let message = match server_message {
            Some(m) => format!("Request rejected: {m}"),
            None => "Request rejected".to_string(),
        };
        Self {
            kind: GatewayErrorKind::Rejected,
            message,
            detail: None,
        }
    }

    /// Server-supplied detail, suitable for showing to the user
    pub fn user_detail(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request timed out: {err}"))
        } else if err.is_decode() {
            Self::decode(format!("Invalid response body: {err}"))
        } else {
            Self::network(format!("Request failed: {err}"))
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Connection refused, DNS, reset
    Network,
    /// Transport-level timeout
    Timeout,
    /// 401/403
    Auth,
    /// Other 4xx
    InvalidRequest,
    /// 5xx
    ServerError,
    /// Envelope `status` was not `success`
    Rejected,
    /// Body did not match the expected shape
    Decode,
}
