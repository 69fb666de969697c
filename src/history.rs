use crate::api::client::ChatService;
use crate::api::models::Message;
use crate::error::Result;
use crate::selector::HistoryTicket;
use crate::utils::spawn_async;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A finished history request, tagged with the conversation it was for.
#[derive(Debug)]
pub struct HistoryLoad {
    pub ticket: HistoryTicket,
    pub result: Result<Vec<Message>>,
}

/// Fetches the pair's history and returns it oldest first.
pub async fn fetch_history<S: ChatService + ?Sized>(
    service: &S,
    local_user: &str,
    contact: &str,
) -> Result<Vec<Message>> {
    let mut chats = service.chat_history(local_user, contact).await?;
    chats.reverse();
    Ok(chats)
}

/// Runs [`fetch_history`] in the background and posts the result, however
/// late, to `done`. Deciding whether it is still wanted is the receiver's job.
pub fn spawn_fetch<T>(
    service: Arc<dyn ChatService>,
    local_user: String,
    ticket: HistoryTicket,
    done: mpsc::UnboundedSender<T>,
) where
    T: From<HistoryLoad> + Send + 'static,
{
    spawn_async(async move {
        let result = fetch_history(service.as_ref(), &local_user, &ticket.contact).await;
        let _ = done.send(T::from(HistoryLoad { ticket, result }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Contact;
    use crate::error::ChatError;
    use async_trait::async_trait;

    struct Canned(Vec<Message>);

    #[async_trait]
    impl ChatService for Canned {
        async fn contact_list(&self, _username: &str) -> Result<Vec<Contact>> {
            Ok(Vec::new())
        }

        async fn verify_contact(&self, _username: &str) -> Result<bool> {
            Ok(false)
        }

        async fn chat_history(&self, u1: &str, u2: &str) -> Result<Vec<Message>> {
            if u2 == "nobody" {
                return Err(ChatError::HistoryLoad(format!("{u1}/{u2}")));
            }
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn newest_first_becomes_chronological() {
        let service = Canned(vec![
            Message::new("alice", "bob", "m3"),
            Message::new("bob", "alice", "m2"),
            Message::new("alice", "bob", "m1"),
        ]);
        let chats = fetch_history(&service, "bob", "alice").await.unwrap();
        let texts: Vec<_> = chats.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn spawned_fetch_reports_its_ticket() {
        let service: Arc<dyn ChatService> = Arc::new(Canned(Vec::new()));
        let (tx, mut rx) = mpsc::unbounded_channel::<HistoryLoad>();
        let ticket = HistoryTicket {
            epoch: 7,
            contact: "nobody".into(),
        };
        spawn_fetch(service, "bob".into(), ticket.clone(), tx);

        let load = rx.recv().await.unwrap();
        assert_eq!(load.ticket, ticket);
        assert!(matches!(load.result, Err(ChatError::HistoryLoad(_))));
    }
}
