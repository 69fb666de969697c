use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Contact {
    pub username: String,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub last_activity: i64,
}

/// A chat line as the server stores and relays it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Message {
    pub fn new(from: impl Into<String>, to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            from: from.into(),
            to: to.into(),
            message: message.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatPayload {
    pub from: String,
    pub to: String,
    pub message: String,
}

/// Frames written to the persistent connection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    /// Presence announcement, sent once after the socket opens.
    Bootup { user: String },
    Message { chat: ChatPayload },
}

impl OutboundFrame {
    pub fn chat(from: &str, to: &str, message: &str) -> Self {
        OutboundFrame::Message {
            chat: ChatPayload {
                from: from.to_string(),
                to: to.to_string(),
                message: message.to_string(),
            },
        }
    }
}

/// Envelope used by every request/response endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: bool,
    pub data: Option<T>,
}
