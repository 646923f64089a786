use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::TelegramConfig;
use crate::models::Settings;
use crate::notifier::{Notifier, NotifyOutcome};
use crate::utils::error::{AppError, Result};

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(TelegramNotifier {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }

    fn create_payload(&self, chat_id: &str, text: &str) -> serde_json::Value {
        json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, settings: &Settings, text: &str) -> Result<NotifyOutcome> {
        if !settings.has_credentials() {
            tracing::debug!("Telegram credentials not set, skipping notification");
            return Ok(NotifyOutcome::Skipped);
        }

        let token = settings.tg_token.trim();
        let payload = self.create_payload(settings.tg_chat_id.trim(), text);

        let response = self
            .client
            .post(self.endpoint(token))
            .json(&payload)
            .send()
            .await
            // The endpoint URL embeds the bot token; keep it out of the error text.
            .map_err(|e| AppError::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!("telegram returned {}: {}", status, body)));
        }

        Ok(NotifyOutcome::Sent)
    }
}
