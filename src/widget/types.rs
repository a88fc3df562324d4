//! Message model and chat wire format.

use crate::common::security::sanitize_text;
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// What a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
}

/// A message in a session's history.
///
/// The text is escaped on construction and the fields are read-only, so a
/// `Message` can always be rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: String,
    text: String,
    sender: Sender,
    timestamp: u64,
    kind: MessageKind,
}

impl Message {
    /// Build a message from untrusted text, escaping it for display
    pub fn from_untrusted(
        id: String,
        sender: Sender,
        kind: MessageKind,
        raw_text: &str,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            text: sanitize_text(raw_text),
            sender,
            timestamp,
            kind,
        }
    }

    /// Build a message from text that is already escaped, such as
    /// configuration strings that went through the config sanitizer
    pub(crate) fn from_sanitized(
        id: String,
        sender: Sender,
        kind: MessageKind,
        text: String,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            text,
            sender,
            timestamp,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Escaped, render-ready text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Creation time in milliseconds since the Unix epoch
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }
}

/// Body sent to the response source for each user message
///
/// # Examples
///
/// ```
/// use chat_widget_core::widget::ChatRequest;
///
/// let request = ChatRequest {
///     message: "hello".to_string(),
///     session_id: "abc123".to_string(),
///     user_id: None,
/// };
/// let json = serde_json::to_string(&request).unwrap();
/// assert_eq!(json, r#"{"message":"hello","sessionId":"abc123"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
}

/// Reply from the response source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}
