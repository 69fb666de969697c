use crate::api::models::Message;
use serde_json::Value;

/// What a single inbound text frame turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingEvent {
    Chat(Message),
    /// Parseable or not, the frame cannot be routed. Carries the reason.
    Ignored(String),
}

impl IncomingEvent {
    /// Any JSON object with a string `from` field is a routable chat.
    pub fn from_text(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => return IncomingEvent::Ignored(format!("unparseable frame: {e}")),
        };
        if !value.get("from").is_some_and(Value::is_string) {
            return IncomingEvent::Ignored("frame has no sender".into());
        }
        match serde_json::from_value::<Message>(value) {
            Ok(msg) => IncomingEvent::Chat(msg),
            Err(e) => IncomingEvent::Ignored(format!("malformed chat: {e}")),
        }
    }
}
