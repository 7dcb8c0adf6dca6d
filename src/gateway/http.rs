//! HTTP implementation of the remote gateway

use super::types::{
    ChatHistoryData, ClearHistoryData, Envelope, PredictionData, PredictionListData,
    SendMessageBody, SendMessageData, WelcomeData,
};
use super::{AssessmentResult, ChatExchange, ChatReply, GatewayError, RemoteGateway};
use crate::assessment::StagedFile;
use crate::config::ClientConfig;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Gateway backed by the REST API
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::decode(format!("Invalid response body: {e}")))?;
        envelope.into_data()
    }
}

/// Map a non-2xx response to an error, keeping the server's `detail` when present
fn classify_error(status: StatusCode, body: &str) -> GatewayError {
    let detail = extract_detail(body);
    let message = format!("HTTP {}: {}", status.as_u16(), detail.as_deref().unwrap_or(body));

    let err = match status.as_u16() {
        401 | 403 => GatewayError::auth(message),
        400..=499 => GatewayError::invalid_request(message),
        _ => GatewayError::server_error(message),
    };

    match detail {
        Some(d) => err.with_detail(d),
        None => err,
    }
}

/// `{"detail": "..."}` is a plain string for handled errors and a list for
/// validation failures; only the string form is user-facing.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn welcome(&self) -> Result<String, GatewayError> {
        let data: WelcomeData = self.execute(self.client.get(self.url("/chat/welcome"))).await?;
        Ok(data.message)
    }

    async fn chat_history(&self, limit: usize) -> Result<Vec<ChatExchange>, GatewayError> {
        let request = self
            .client
            .get(self.url("/chat/history"))
            .query(&[("limit", limit)]);
        let data: ChatHistoryData = self.execute(request).await?;
        Ok(data.chats)
    }

    async fn send_message(&self, text: &str) -> Result<ChatReply, GatewayError> {
        let request = self
            .client
            .post(self.url("/chat/send"))
            .json(&SendMessageBody { message: text });
        let data: SendMessageData = self.execute(request).await?;
        Ok(data.chat)
    }

    async fn clear_chat_history(&self) -> Result<u64, GatewayError> {
        let data: ClearHistoryData = self.execute(self.client.delete(self.url("/chat/clear"))).await?;
        Ok(data.deleted_count)
    }

    async fn upload_assessment(&self, file: &StagedFile) -> Result<AssessmentResult, GatewayError> {
        let part = Part::bytes(file.data().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| GatewayError::invalid_request(format!("Invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        let request = self.client.post(self.url("/prediction/upload")).multipart(form);
        let data: PredictionData = self.execute(request).await?;
        data.prediction
            .ok_or_else(|| GatewayError::decode("Upload response carried no prediction"))
    }

    async fn latest_assessment(&self) -> Result<Option<AssessmentResult>, GatewayError> {
        let data: PredictionData = self.execute(self.client.get(self.url("/prediction/latest"))).await?;
        Ok(data.prediction)
    }

    async fn assessment_history(&self, limit: usize) -> Result<Vec<AssessmentResult>, GatewayError> {
        let request = self
            .client
            .get(self.url("/prediction/history"))
            .query(&[("limit", limit)]);
        let data: PredictionListData = self.execute(request).await?;
        Ok(data.predictions)
    }
}
