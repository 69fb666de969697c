//! Membership of chats in the active conversation, and the transcript they
//! land in.

use crate::api::models::{Message, OutboundFrame};
use crate::selector::ConversationSelector;
use serde::Serialize;

/// A transcript entry as the rendering layer needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptLine {
    pub from: String,
    pub text: String,
    /// Sent by the local user; drawn on the opposite side.
    pub own: bool,
}

/// Chats of the active conversation, oldest first.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// Replaces the contents with `history` (oldest first). Chats that were
    /// appended while the history was in flight are kept after it, minus
    /// those the history already contains. Matching is by server `id`, which
    /// the server sets on every relayed chat; chats without one are kept.
    pub fn seed(&mut self, history: Vec<Message>) {
        let live = std::mem::replace(&mut self.messages, history);
        for msg in live {
            let known = msg.id.is_some() && self.messages.iter().any(|h| h.id == msg.id);
            if !known {
                self.messages.push(msg);
            }
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// For views that stack bubbles bottom-up.
    pub fn newest_first(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev()
    }

    pub fn lines(&self, local_user: &str) -> Vec<TranscriptLine> {
        self.messages
            .iter()
            .map(|m| TranscriptLine {
                from: m.from.clone(),
                text: m.message.clone(),
                own: m.from == local_user,
            })
            .collect()
    }
}

/// A chat belongs on screen when its sender is the selected contact or the
/// local user (the server echoes our own sends back).
pub fn accepts(selector: &ConversationSelector, msg: &Message) -> bool {
    selector.remote_contact() == Some(msg.from.as_str()) || selector.local_user() == msg.from
}

/// Appends `msg` if it belongs to the active conversation.
pub fn route(selector: &ConversationSelector, transcript: &mut Transcript, msg: Message) -> bool {
    if accepts(selector, &msg) {
        transcript.push(msg);
        true
    } else {
        log::debug!("dropping chat from {} outside the active conversation", msg.from);
        false
    }
}

/// Builds the outbound frame for the compose buffer, or `None` when there is
/// no contact selected or nothing to send.
pub fn compose(selector: &ConversationSelector, text: &str) -> Option<OutboundFrame> {
    let to = selector.remote_contact()?;
    if text.is_empty() {
        return None;
    }
    Some(OutboundFrame::chat(selector.local_user(), to, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_id(mut msg: Message, id: &str) -> Message {
        msg.id = Some(id.to_string());
        msg
    }

    #[test]
    fn only_active_pair_is_routed() {
        let mut selector = ConversationSelector::new("bob");
        selector.select_contact("alice");
        let mut transcript = Transcript::new();

        let inbound = [
            Message::new("alice", "bob", "hi"),
            Message::new("carol", "bob", "spam"),
            Message::new("bob", "alice", "hello"),
            Message::new("dave", "carol", "elsewhere"),
        ];
        for msg in inbound {
            route(&selector, &mut transcript, msg);
        }

        let senders: Vec<_> = transcript.messages().iter().map(|m| m.from.as_str()).collect();
        assert_eq!(senders, ["alice", "bob"]);
    }

    #[test]
    fn own_echo_is_routed_without_selection() {
        let selector = ConversationSelector::new("bob");
        assert!(accepts(&selector, &Message::new("bob", "alice", "x")));
        assert!(!accepts(&selector, &Message::new("alice", "bob", "x")));
    }

    #[test]
    fn seed_keeps_live_chats_not_in_history() {
        let mut transcript = Transcript::new();
        transcript.push(with_id(Message::new("alice", "bob", "dup"), "chat#2"));
        transcript.push(Message::new("alice", "bob", "fresh"));

        transcript.seed(vec![
            with_id(Message::new("alice", "bob", "old"), "chat#1"),
            with_id(Message::new("alice", "bob", "dup"), "chat#2"),
        ]);

        let texts: Vec<_> = transcript.messages().iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["old", "dup", "fresh"]);
    }

    #[test]
    fn lines_mark_own_messages() {
        let mut transcript = Transcript::new();
        transcript.push(Message::new("alice", "bob", "hi"));
        transcript.push(Message::new("bob", "alice", "yo"));

        let lines = transcript.lines("bob");
        assert!(!lines[0].own);
        assert!(lines[1].own);
        assert_eq!(transcript.newest_first().next().unwrap().message, "yo");
    }

    #[test]
    fn compose_requires_contact_and_text() {
        let mut selector = ConversationSelector::new("bob");
        assert_eq!(compose(&selector, "hello"), None);

        selector.select_contact("alice");
        assert_eq!(compose(&selector, ""), None);
        assert_eq!(
            compose(&selector, "hello"),
            Some(OutboundFrame::chat("bob", "alice", "hello"))
        );
    }
}
