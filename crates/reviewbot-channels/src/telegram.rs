//! Telegram Bot channel — message sending via Bot API.

use async_trait::async_trait;
use reviewbot_core::config::{ReviewBotConfig, Secrets};
use reviewbot_core::error::{Result, ReviewBotError};
use reviewbot_core::traits::Notifier;
use serde::Deserialize;

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_api_base(bot_token, "https://api.telegram.org")
    }

    /// Point at a different Bot API server (self-hosted or test).
    pub fn with_api_base(bot_token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ReviewBotConfig, secrets: &Secrets) -> Self {
        Self::with_api_base(secrets.telegram_token.clone(), config.telegram_api_base.clone())
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Send a plain-text message.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ReviewBotError::Notification(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ReviewBotError::Notification(format!("Invalid send response: {e}")))?;

        if !result.ok {
            return Err(ReviewBotError::Notification(format!(
                "Send failed: {}",
                result.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, destination: &str, text: &str) -> Result<()> {
        self.send_message(destination, text).await?;
        tracing::debug!("✉️ Telegram message sent to {destination}: \"{text}\"");
        Ok(())
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}
