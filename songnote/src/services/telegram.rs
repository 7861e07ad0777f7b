//! Telegram Bot API delivery
//!
//! Two calls per run:
//! - `sendMessage` - MarkdownV2 inline link to the song, link preview disabled
//! - `sendVideoNote` - multipart upload of the processed clip
//!
//! # API Reference
//! - Endpoint: https://api.telegram.org/bot<token>/<method>
//! - Documentation: https://core.telegram.org/bots/api

use crate::error::DeliveryError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use tracing::{debug, info};

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Posts the text message and video note to a chat
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a MarkdownV2 message without link preview
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError>;

    /// Upload `video` as a round video note
    async fn send_video_note(
        &self,
        chat_id: &str,
        video: &Path,
        length: u32,
        duration_secs: u32,
    ) -> Result<(), DeliveryError>;
}

/// Bot API client
pub struct TelegramSender {
    http_client: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramSender {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, DeliveryError> {
        let http_client = Client::builder().build()?;
        Ok(Self::with_client(http_client, TELEGRAM_API_URL, bot_token))
    }

    /// Create sender against a custom API base (used by tests)
    pub fn with_client(
        http_client: Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn check(method: &'static str, response: reqwest::Response) -> Result<(), DeliveryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api {
                method,
                status: status.as_u16(),
                body,
            });
        }
        debug!(method, status = %status, "Telegram call succeeded");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        info!(chat_id, "Sending link message");

        let params = [
            ("chat_id", chat_id),
            ("text", text),
            ("parse_mode", "MarkdownV2"),
            ("disable_web_page_preview", "true"),
        ];
        let response = self
            .http_client
            .post(self.method_url("sendMessage"))
            .form(&params)
            .send()
            .await?;

        Self::check("sendMessage", response).await
    }

    async fn send_video_note(
        &self,
        chat_id: &str,
        video: &Path,
        length: u32,
        duration_secs: u32,
    ) -> Result<(), DeliveryError> {
        info!(chat_id, video = %video.display(), "Sending video note");

        let bytes = tokio::fs::read(video).await?;
        let file_name = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video_note.mp4".to_string());
        let part = Part::bytes(bytes).file_name(file_name).mime_str("video/mp4")?;

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("length", length.to_string())
            .text("duration", duration_secs.to_string())
            .part("video_note", part);

        let response = self
            .http_client
            .post(self.method_url("sendVideoNote"))
            .multipart(form)
            .send()
            .await?;

        Self::check("sendVideoNote", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let sender = TelegramSender::with_client(Client::new(), "http://localhost:1234/", "123:abc");
        assert_eq!(
            sender.method_url("sendMessage"),
            "http://localhost:1234/bot123:abc/sendMessage"
        );
    }
}
