use crate::api::client::ChatService;
use crate::api::models::Contact;
use crate::error::{ChatError, Result};
use crate::utils::now_secs;

/// Contacts known to this session, in display order.
#[derive(Debug, Default)]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contains(&self, username: &str) -> bool {
        self.contacts.iter().any(|c| c.username == username)
    }

    /// One-shot fetch. Any failure leaves the directory empty.
    pub async fn load<S: ChatService + ?Sized>(
        &mut self,
        service: &S,
        local_user: &str,
    ) -> &[Contact] {
        let result = service.contact_list(local_user).await;
        self.apply_load(result);
        &self.contacts
    }

    pub fn apply_load(&mut self, result: Result<Vec<Contact>>) {
        match result {
            Ok(contacts) => {
                log::info!("loaded {} contacts", contacts.len());
                self.contacts = contacts;
            }
            Err(e) => {
                log::warn!("{}", e);
                self.contacts.clear();
            }
        }
    }

    pub async fn verify_and_add<S: ChatService + ?Sized>(
        &mut self,
        service: &S,
        candidate: &str,
    ) -> Result<Contact> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(ChatError::InvalidContact(String::new()));
        }
        let verified = service.verify_contact(candidate).await;
        self.apply_verification(candidate, verified)
    }

    /// Puts a verified contact at the front with a fresh activity stamp. A
    /// contact already in the list is moved rather than duplicated.
    pub fn apply_verification(
        &mut self,
        candidate: &str,
        verified: Result<bool>,
    ) -> Result<Contact> {
        match verified? {
            true => {
                if self.contains(candidate) {
                    log::debug!("{} is already listed; moving it to the front", candidate);
                }
                self.contacts.retain(|c| c.username != candidate);
                let contact = Contact {
                    username: candidate.to_string(),
                    last_activity: now_secs(),
                };
                self.contacts.insert(0, contact.clone());
                Ok(contact)
            }
            false => Err(ChatError::InvalidContact(candidate.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Message;
    use async_trait::async_trait;

    struct Server {
        contacts: Option<Vec<Contact>>,
        known: Vec<&'static str>,
    }

    #[async_trait]
    impl ChatService for Server {
        async fn contact_list(&self, _username: &str) -> Result<Vec<Contact>> {
            self.contacts
                .clone()
                .ok_or_else(|| ChatError::DirectoryLoad("down".into()))
        }

        async fn verify_contact(&self, username: &str) -> Result<bool> {
            Ok(self.known.iter().any(|k| *k == username))
        }

        async fn chat_history(&self, _u1: &str, _u2: &str) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }
    }

    fn contact(name: &str, at: i64) -> Contact {
        Contact {
            username: name.into(),
            last_activity: at,
        }
    }

    #[tokio::test]
    async fn load_failure_leaves_directory_empty() {
        let mut dir = ContactDirectory::new();
        dir.apply_load(Ok(vec![contact("alice", 1)]));

        let server = Server { contacts: None, known: vec![] };
        assert!(dir.load(&server, "bob").await.is_empty());
    }

    #[tokio::test]
    async fn verified_contact_is_prepended() {
        let server = Server {
            contacts: Some(vec![contact("carol", 10), contact("dave", 5)]),
            known: vec!["alice"],
        };
        let mut dir = ContactDirectory::new();
        dir.load(&server, "bob").await;

        let before = now_secs();
        let added = dir.verify_and_add(&server, "alice").await.unwrap();
        assert_eq!(added.username, "alice");
        assert!((added.last_activity - before).abs() <= 2);

        let names: Vec<_> = dir.contacts().iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, ["alice", "carol", "dave"]);
    }

    #[tokio::test]
    async fn rejected_contact_leaves_directory_unchanged() {
        let server = Server {
            contacts: Some(vec![contact("carol", 10)]),
            known: vec![],
        };
        let mut dir = ContactDirectory::new();
        dir.load(&server, "bob").await;

        let err = dir.verify_and_add(&server, "mallory").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidContact(ref name) if name == "mallory"));
        assert_eq!(dir.contacts(), &[contact("carol", 10)]);
    }

    #[test]
    fn re_adding_moves_instead_of_duplicating() {
        let mut dir = ContactDirectory::new();
        dir.apply_load(Ok(vec![contact("carol", 10), contact("alice", 1)]));
        dir.apply_verification("alice", Ok(true)).unwrap();

        let names: Vec<_> = dir.contacts().iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, ["alice", "carol"]);
    }

    #[test]
    fn transport_failure_is_not_an_invalid_contact() {
        let mut dir = ContactDirectory::new();
        let err = dir
            .apply_verification("alice", Err(ChatError::Send("offline".into())))
            .unwrap_err();
        assert!(matches!(err, ChatError::Send(_)));
        assert!(dir.contacts().is_empty());
    }
}
