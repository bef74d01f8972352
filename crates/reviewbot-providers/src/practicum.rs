//! Practicum homework-status API client.
//!
//! `GET <endpoint>?from_date=<cursor>` with `Authorization: OAuth <token>`.
//! Only `200 OK` with a JSON body counts as success.

use async_trait::async_trait;
use reviewbot_core::config::{ReviewBotConfig, Secrets};
use reviewbot_core::error::{Result, ReviewBotError};
use reviewbot_core::traits::HomeworkApi;
use reviewbot_core::types::PollCursor;
use serde_json::Value;

/// HTTP client for the homework-status endpoint.
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from loaded configuration and secrets.
    pub fn from_config(config: &ReviewBotConfig, secrets: &Secrets) -> Self {
        Self::new(config.endpoint.clone(), secrets.practicum_token.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from: &PollCursor) -> Result<Value> {
        tracing::debug!("🌐 GET {} from_date={}", self.endpoint, from);

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from.as_str())])
            .send()
            .await
            .map_err(ReviewBotError::transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ReviewBotError::http_status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(ReviewBotError::bad_json)
    }
}
