// src/notifier/telegram.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::TelegramConfig;
use crate::errors::DeliveryError;
use crate::notifier::Notifier;

/// Sends messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: TelegramConfig) -> Self {
        Self { client, config }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.token
        )
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: message,
        };

        let resp = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        let parsed: Option<BotApiResponse> = serde_json::from_str(&text).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            Some(api) => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: api
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
            None if status.is_success() => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: format!("unreadable Bot API response: {}", text),
            }),
            None => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: text,
            }),
        }
    }
}
