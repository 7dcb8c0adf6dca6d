//! Client configuration

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_ASSESSMENT_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Bearer token for the session, if already signed in
    pub token: Option<String>,
    /// How many past exchanges seed a new conversation
    pub chat_history_limit: usize,
    /// How many past assessments the history view loads
    pub assessment_history_limit: usize,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            chat_history_limit: DEFAULT_CHAT_HISTORY_LIMIT,
            assessment_history_limit: DEFAULT_ASSESSMENT_HISTORY_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("RAICARE_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let token = lookup("RAICARE_TOKEN").filter(|t| !t.trim().is_empty());

        Self {
            api_url,
            token,
            chat_history_limit: parse_or(
                &lookup,
                "RAICARE_CHAT_HISTORY_LIMIT",
                defaults.chat_history_limit,
            ),
            assessment_history_limit: parse_or(
                &lookup,
                "RAICARE_ASSESSMENT_HISTORY_LIMIT",
                defaults.assessment_history_limit,
            ),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "RAICARE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            default
        }),
    }
}
