pub mod error;
pub mod types;

pub use error::{Result, TelegramError};
pub use types::{BotResponse, Chat, Message, SendMessage};

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bot API limit for `sendMessage` text, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Bot API limit for media captions, in characters.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

pub struct TelegramClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, BASE_URL)
    }

    pub fn with_base_url(token: String, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Send a plain-text message. Text past [`MAX_MESSAGE_CHARS`] is truncated.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<Message> {
        let text = truncate_chars(text, MAX_MESSAGE_CHARS);
        let body = SendMessage {
            chat_id,
            text: &text,
            parse_mode: None,
            disable_web_page_preview: true,
        };

        tracing::debug!(chat_id, chars = text.chars().count(), "Telegram sendMessage");
        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;
        Self::unwrap_response(resp).await
    }

    /// Upload a file as a document. Caption past [`MAX_CAPTION_CHARS`] is truncated.
    pub async fn send_document(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<Message> {
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name.to_string()));
        if let Some(caption) = caption {
            form = form.text("caption", truncate_chars(caption, MAX_CAPTION_CHARS));
        }

        tracing::debug!(chat_id, file_name, "Telegram sendDocument");
        let resp = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        Self::unwrap_response(resp).await
    }

    async fn unwrap_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await?;
        let parsed: BotResponse<T> = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    status: status.as_u16(),
                    description: body,
                });
            }
            Err(e) => return Err(e.into()),
        };

        match parsed.result {
            Some(result) if parsed.ok => Ok(result),
            _ => Err(TelegramError::Api {
                status: parsed.error_code.unwrap_or(status.as_u16()),
                description: parsed.description.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn long_text_capped_at_limit() {
        let text = "x".repeat(5000);
        let out = truncate_chars(&text, MAX_MESSAGE_CHARS);
        assert_eq!(out.chars().count(), MAX_MESSAGE_CHARS);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multi-byte characters must never be split.
        let text = "जम्मू".repeat(400);
        let out = truncate_chars(&text, MAX_CAPTION_CHARS);
        assert_eq!(out.chars().count(), MAX_CAPTION_CHARS);
    }

    #[test]
    fn method_url_embeds_token() {
        let client = TelegramClient::with_base_url("123:abc".into(), "http://localhost/").unwrap();
        assert_eq!(
            client.method_url("sendMessage"),
            "http://localhost/bot123:abc/sendMessage"
        );
    }
}
