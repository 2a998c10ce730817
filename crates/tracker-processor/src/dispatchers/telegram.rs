//! Telegram delivery for reward notifications.
//!
//! Sends messages via the Bot API `sendMessage` method with Markdown
//! formatting, optionally into a forum topic.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use tracker_core::types::RewardMatchEvent;
use tracker_core::{Result, TelegramConfig, TrackerError};

use super::NotificationDispatcher;
use crate::message::MessageTemplate;

/// Telegram Bot API client bound to one chat
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
    thread_id: Option<i64>,
}

impl TelegramNotifier {
    /// Create a notifier from a configuration that `is_configured()`
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let (bot_token, chat_id) = match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat)) => (token.clone(), chat.clone()),
            _ => {
                return Err(TrackerError::MissingEnvVar(
                    "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID".to_string(),
                ))
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TrackerError::Dispatch(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
            thread_id: config.thread_id,
        })
    }

    fn form_params(&self, message: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("chat_id", self.chat_id.clone()),
            ("text", message.to_string()),
            ("parse_mode", "Markdown".to_string()),
        ];
        if let Some(thread_id) = self.thread_id {
            params.push(("message_thread_id", thread_id.to_string()));
        }
        params
    }

    /// Send a message to the configured chat
    pub async fn send_message(&self, message: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);

        // Errors carry the URL, which contains the token
        let resp = self
            .client
            .post(&url)
            .form(&self.form_params(message))
            .send()
            .await
            .map_err(|e| TrackerError::Dispatch(e.without_url().to_string()))?;

        let status = resp.status();
        if status.is_success() {
            debug!("Telegram notification sent successfully");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(TrackerError::Dispatch(format!(
            "Telegram API returned {}: {}",
            status, body
        )))
    }
}

/// Renders reward events and sends them through Telegram
pub struct TelegramDispatcher {
    notifier: TelegramNotifier,
    template: MessageTemplate,
}

impl TelegramDispatcher {
    pub fn new(notifier: TelegramNotifier, template: MessageTemplate) -> Self {
        Self { notifier, template }
    }
}

#[async_trait]
impl NotificationDispatcher for TelegramDispatcher {
    async fn dispatch(&self, event: &RewardMatchEvent) -> Result<()> {
        let message = self.template.render(event);
        self.notifier.send_message(&message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(thread_id: Option<i64>) -> TelegramConfig {
        TelegramConfig {
            enabled: true,
            bot_token: Some("123:secret".to_string()),
            chat_id: Some("-100200".to_string()),
            thread_id,
            api_url: "http://127.0.0.1:9/".to_string(),
        }
    }

    #[test]
    fn test_form_params() {
        let notifier = TelegramNotifier::new(&config(Some(61))).unwrap();
        let params = notifier.form_params("hello");
        assert_eq!(
            params,
            vec![
                ("chat_id", "-100200".to_string()),
                ("text", "hello".to_string()),
                ("parse_mode", "Markdown".to_string()),
                ("message_thread_id", "61".to_string()),
            ]
        );

        let notifier = TelegramNotifier::new(&config(None)).unwrap();
        assert!(notifier
            .form_params("hello")
            .iter()
            .all(|(k, _)| *k != "message_thread_id"));
    }

    #[test]
    fn test_requires_credentials() {
        let mut cfg = config(None);
        cfg.chat_id = None;
        assert!(matches!(
            TelegramNotifier::new(&cfg),
            Err(TrackerError::MissingEnvVar(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_dispatch_error_without_token() {
        let notifier = TelegramNotifier::new(&config(None)).unwrap();
        match notifier.send_message("hello").await {
            Err(TrackerError::Dispatch(reason)) => assert!(!reason.contains("secret")),
            other => panic!("expected dispatch error, got {:?}", other),
        }
    }
}
