//! Wire types exchanged with the backend

use super::GatewayError;
use crate::severity::{self, SeverityLevel};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Check the discriminant before trusting the payload
    pub fn into_data(self) -> Result<T, GatewayError> {
        if self.status != "success" {
            return Err(GatewayError::rejected(self.message.as_deref()));
        }
        self.data
            .ok_or_else(|| GatewayError::decode("Successful response carried no data"))
    }
}

/// One persisted question/answer pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExchange {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "message")]
    pub user_text: String,
    #[serde(rename = "response")]
    pub bot_text: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Reply to a sent chat message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Result of one X-ray assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    #[serde(default)]
    pub id: Option<String>,
    /// 0-100, may be fractional
    #[serde(rename = "result_percentage")]
    pub percentage: f64,
    #[serde(
        rename = "severity_level",
        default,
        deserialize_with = "severity::deserialize_lenient"
    )]
    pub severity: Option<SeverityLevel>,
    #[serde(rename = "timestamp", deserialize_with = "deserialize_timestamp")]
    pub analyzed_at: DateTime<Utc>,
    #[serde(rename = "image_url", default)]
    pub image_reference: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WelcomeData {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatHistoryData {
    #[serde(default)]
    pub chats: Vec<ChatExchange>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageData {
    pub chat: ChatReply,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageBody<'a> {
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClearHistoryData {
    #[serde(default)]
    pub deleted_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionData {
    #[serde(default)]
    pub prediction: Option<AssessmentResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionListData {
    #[serde(default)]
    pub predictions: Vec<AssessmentResult>,
}

/// Parse a wire timestamp. The server emits naive UTC ISO-8601;
/// RFC 3339 with an offset is also accepted.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
