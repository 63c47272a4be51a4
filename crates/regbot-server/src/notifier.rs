//! Outbound notifications to the admin through the Telegram Bot API.
//!
//! Public operations never fail: transport and API errors are logged and
//! reported as `false` (or dropped, for callback acknowledgments).

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use regbot_core::config::TelegramConfig;

use crate::telegram::{AnswerCallbackQuery, InlineKeyboardMarkup, SendMessage};

/// Errors from a single Bot API call.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// Bot token or admin chat id is missing.
    #[error("Telegram bot is not configured")]
    NotConfigured,

    /// HTTP request failed (connect, timeout, body).
    #[error("Telegram request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Bot API returned a non-success status code.
    #[error("Telegram API error (status {status}): {body}")]
    ApiError { status: u16, body: String },
}

/// Client for the admin notification channel.
#[derive(Debug)]
pub struct Notifier {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl Notifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifierError> {
        // reqwest uses rustls-no-provider; Err means a provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        debug!(
            api_base = %config.api_base,
            configured = config.is_configured(),
            "Notifier initialized"
        );

        Ok(Self { http, config })
    }

    pub const fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Send an HTML-formatted message to the admin chat.
    ///
    /// Returns whether the Bot API accepted the message.
    pub async fn send(&self, text: &str, markup: Option<&InlineKeyboardMarkup>) -> bool {
        match self.try_send(text, markup).await {
            Ok(()) => true,
            Err(NotifierError::NotConfigured) => {
                debug!("Skipping admin notification, bot not configured");
                false
            }
            Err(e) => {
                warn!(error = %e, "Admin notification failed");
                false
            }
        }
    }

    /// Answer a callback query so the admin's client stops its spinner.
    pub async fn acknowledge(&self, callback_id: &str, text: &str) {
        if self.config.bot_token.is_empty() {
            debug!("Skipping callback acknowledgment, bot not configured");
            return;
        }
        let body = AnswerCallbackQuery {
            callback_query_id: callback_id,
            text,
        };
        if let Err(e) = self.call("answerCallbackQuery", &body).await {
            warn!(error = %e, callback_id, "Callback acknowledgment failed");
        }
    }

    async fn try_send(
        &self,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), NotifierError> {
        if !self.config.is_configured() {
            return Err(NotifierError::NotConfigured);
        }
        let body = SendMessage {
            chat_id: &self.config.admin_chat_id,
            text,
            parse_mode: "HTML",
            reply_markup: markup,
        };
        self.call("sendMessage", &body).await
    }

    async fn call<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<(), NotifierError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(method, "Telegram call succeeded");
            Ok(())
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            Err(NotifierError::ApiError {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}
