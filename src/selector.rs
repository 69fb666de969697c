/// Identifies one history request by the conversation it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    pub epoch: u64,
    pub contact: String,
}

/// The local user and the currently selected contact.
#[derive(Debug)]
pub struct ConversationSelector {
    local_user: String,
    remote: Option<String>,
    epoch: u64,
}

impl ConversationSelector {
    pub fn new(local_user: impl Into<String>) -> Self {
        Self {
            local_user: local_user.into(),
            remote: None,
            epoch: 0,
        }
    }

    pub fn local_user(&self) -> &str {
        &self.local_user
    }

    pub fn remote_contact(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    pub fn current_conversation(&self) -> (&str, Option<&str>) {
        (&self.local_user, self.remote.as_deref())
    }

    /// Makes `contact` the active conversation. Every selection, including
    /// re-selecting the same contact, starts a new epoch so that responses
    /// issued for an earlier one can be recognised as stale.
    pub fn select_contact(&mut self, contact: &str) -> HistoryTicket {
        self.epoch += 1;
        self.remote = Some(contact.to_string());
        HistoryTicket {
            epoch: self.epoch,
            contact: contact.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &HistoryTicket) -> bool {
        ticket.epoch == self.epoch && self.remote.as_deref() == Some(ticket.contact.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_a_contact() {
        let selector = ConversationSelector::new("bob");
        assert_eq!(selector.current_conversation(), ("bob", None));
    }

    #[test]
    fn only_the_latest_ticket_is_current() {
        let mut selector = ConversationSelector::new("bob");
        let first = selector.select_contact("alice");
        assert!(selector.is_current(&first));

        let second = selector.select_contact("carol");
        assert!(!selector.is_current(&first));
        assert!(selector.is_current(&second));
        assert_eq!(selector.current_conversation(), ("bob", Some("carol")));

        let again = selector.select_contact("carol");
        assert!(!selector.is_current(&second));
        assert!(selector.is_current(&again));
    }
}
