//! HTTP backend adaptor for the Opsdesk engine
//!
//! Implements the engine's three external-service traits against a
//! JSON REST backend:
//!
//! - `GET  {base}/conversations/{id}/messages?page=N` (page 1 = newest)
//! - `POST {base}/conversations/{id}/messages`
//! - `GET  {base}/conversations/{id}/participants?query=...`
//! - `POST {base}/conversations/{id}/read`

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use opsdesk_core::{
    get_env_or, get_required_env, Message, MessageStore, OpsdeskError, OutboundDraft,
    Participant, ParticipantDirectory, ReadTracker, Result, Uuid,
};
use std::sync::OnceLock;
use reqwest::Client;
use tracing::debug;

/// Shared HTTP client for connection pooling
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or initialize the shared HTTP client
fn get_http_client() -> Client {
    HTTP_CLIENT
        .get_or_init(|| {
            Client::builder()
                .pool_max_idle_per_host(20)
                .pool_idle_timeout(std::time::Duration::from_secs(300))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client")
        })
        .clone()
}

/// Connection settings for the Opsdesk backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the REST API, without trailing slash
    pub base_url: String,
    /// Bearer token, when the backend requires one
    pub api_token: Option<String>,
}

impl BackendConfig {
    /// Build from `OPSDESK_API_URL` and `OPSDESK_API_TOKEN`
    pub fn from_env() -> Result<Self> {
        let base_url = get_required_env("OPSDESK_API_URL")?;
        let token = get_env_or("OPSDESK_API_TOKEN", "");
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: if token.is_empty() { None } else { Some(token) },
        })
    }

    /// Explicit configuration
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }
}

/// REST client implementing the engine's service boundaries
///
/// One client serves all three traits; the backend exposes them under a
/// single conversation resource.
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a backend client with the shared connection pool
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: get_http_client(),
            config,
        }
    }

    /// Create a backend client configured from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(BackendConfig::from_env()?))
    }

    fn conversation_url(&self, conversation_id: Uuid, resource: &str) -> String {
        format!(
            "{}/conversations/{}/{}",
            self.config.base_url, conversation_id, resource
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    fn check_status(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(OpsdeskError::store(format!(
                "{} failed with status {}",
                context,
                resp.status()
            )))
        }
    }
}

#[async_trait]
impl MessageStore for HttpBackend {
    async fn fetch_page(&self, conversation_id: Uuid, page: u32) -> Result<Vec<Message>> {
        let url = self.conversation_url(conversation_id, "messages");
        debug!(%conversation_id, page, "fetching message page");

        let resp = self
            .authorize(self.client.get(&url).query(&[("page", page)]))
            .send()
            .await?;
        let resp = Self::check_status(resp, "message page fetch")?;
        Ok(resp.json::<Vec<Message>>().await?)
    }

    async fn send(&self, draft: OutboundDraft) -> Result<Message> {
        let url = self.conversation_url(draft.conversation_id, "messages");

        let resp = self
            .authorize(self.client.post(&url).json(&draft))
            .send()
            .await?;
        let resp = Self::check_status(resp, "message send")?;
        Ok(resp.json::<Message>().await?)
    }
}

#[async_trait]
impl ParticipantDirectory for HttpBackend {
    async fn list_participants(
        &self,
        conversation_id: Uuid,
        query: Option<String>,
    ) -> Result<Vec<Participant>> {
        let url = self.conversation_url(conversation_id, "participants");

        let mut request = self.client.get(&url);
        if let Some(query) = query {
            request = request.query(&[("query", query)]);
        }
        let resp = self.authorize(request).send().await?;
        let resp = Self::check_status(resp, "participant listing")?;
        Ok(resp.json::<Vec<Participant>>().await?)
    }
}

#[async_trait]
impl ReadTracker for HttpBackend {
    async fn clear_unread(&self, conversation_id: Uuid) -> Result<()> {
        let url = self.conversation_url(conversation_id, "read");

        let resp = self.authorize(self.client.post(&url)).send().await?;
        Self::check_status(resp, "unread clear")?;
        Ok(())
    }
}
