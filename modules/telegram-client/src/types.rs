use serde::{Deserialize, Serialize};

/// Body for `sendMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_web_page_preview: bool,
}

/// Every Bot API call answers with this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct BotResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<u16>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// The subset of a Telegram `Message` the pipeline cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub date: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_response_carries_description() {
        let json = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let parsed: BotResponse<Message> = serde_json::from_str(json).unwrap();
        assert!(!parsed.ok);
        assert!(parsed.result.is_none());
        assert_eq!(parsed.error_code, Some(400));
    }

    #[test]
    fn message_body_omits_unset_options() {
        let body = SendMessage {
            chat_id: "-100123",
            text: "hello",
            parse_mode: None,
            disable_web_page_preview: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("parse_mode").is_none());
        assert!(value.get("disable_web_page_preview").is_none());
    }
}
