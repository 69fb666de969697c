use crate::api::models::{ApiResponse, Contact, Message};
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use url::Url;

/// Request/response side of the chat server: contacts and history.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn contact_list(&self, username: &str) -> Result<Vec<Contact>>;

    /// `Ok(false)` means the server answered and the user does not exist.
    async fn verify_contact(&self, username: &str) -> Result<bool>;

    /// History for the pair, newest first as the server delivers it.
    async fn chat_history(&self, u1: &str, u2: &str) -> Result<Vec<Message>>;
}

pub struct ApiClient {
    pub http: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }
}

#[async_trait]
impl ChatService for ApiClient {
    async fn contact_list(&self, username: &str) -> Result<Vec<Contact>> {
        let mut url = self.endpoint("contact-list")?;
        url.query_pairs_mut().append_pair("username", username);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ChatError::DirectoryLoad(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ChatError::DirectoryLoad(format!("HTTP {}", resp.status())));
        }
        let body: ApiResponse<Vec<Contact>> = resp
            .json()
            .await
            .map_err(|e| ChatError::DirectoryLoad(e.to_string()))?;

        // The server reports an empty list as a missing payload.
        body.data
            .ok_or_else(|| ChatError::DirectoryLoad("response carried no contacts".into()))
    }

    async fn verify_contact(&self, username: &str) -> Result<bool> {
        let url = self.endpoint("verify-contact")?;
        let body = serde_json::json!({ "username": username });

        // A server error says nothing about whether the user exists.
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let body: ApiResponse<serde_json::Value> = resp.json().await?;
        Ok(body.status)
    }

    async fn chat_history(&self, u1: &str, u2: &str) -> Result<Vec<Message>> {
        let mut url = self.endpoint("chat-history")?;
        url.query_pairs_mut()
            .append_pair("u1", u1)
            .append_pair("u2", u2);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ChatError::HistoryLoad(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ChatError::HistoryLoad(format!("HTTP {}", resp.status())));
        }
        let body: ApiResponse<Vec<Message>> = resp
            .json()
            .await
            .map_err(|e| ChatError::HistoryLoad(e.to_string()))?;

        match body.data {
            Some(chats) if body.status => Ok(chats),
            _ => Err(ChatError::HistoryLoad("server reported no history".into())),
        }
    }
}
