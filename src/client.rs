//! High-level client for the RAG chat backend.
//!
//! This module provides [`ChatClient`], the main entry point. It holds
//! the configuration and an HTTP connection pool, creates
//! [`ChatSession`]s for streaming conversations, and exposes the
//! collaborator endpoints: one-shot queries, attachment lookup, and
//! feedback.
//!
//! # Example
//!
//! ```ignore
//! use ragchat::{ChatClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ChatClient::builder()
//!         .rag_base_url("http://rag.internal:8001")
//!         .build()?;
//!
//!     // One-shot query
//!     let answer = client.query("who approved the budget?").await?;
//!     println!("{}", answer.answer);
//!
//!     // Streaming conversation
//!     let session = client.session();
//!     let text = session.send_and_collect("and when?").await?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::observer::StreamObserver;
use crate::protocol::{Attachment, AttachmentList, Feedback, PostId, QueryRequest, RagAnswer};
use crate::session::ChatSession;
use crate::stream::with_timeout;
use crate::{Error, Result};

/// A client for the RAG chat backend.
///
/// `ChatClient` is `Send + Sync` and can be shared across tasks; it is a
/// thin handle over an `Arc`'d configuration and a reqwest connection
/// pool, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct ChatClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl ChatClient {
    /// Create a new client with default configuration (local backends).
    pub fn new() -> Result<Self> {
        let config = ClientConfig::builder().build()?;
        Ok(Self::with_config(config))
    }

    /// Create a new client with the given configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Create a builder for configuring a new client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get a reference to the client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a new conversation.
    ///
    /// Each session owns its own transcript and admits one in-flight
    /// query at a time; create multiple sessions for concurrent
    /// conversations.
    pub fn session(&self) -> ChatSession {
        ChatSession::new(Arc::clone(&self.config), self.http.clone())
    }

    /// Ask a question and wait for the complete answer.
    ///
    /// This is the non-streaming endpoint: the backend returns the full
    /// answer with citations and the policy verdict in one response.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyQuery`] for a blank query; transport errors for
    /// connection failures, non-success statuses, or an unparseable
    /// body.
    pub async fn query(&self, query: &str) -> Result<RagAnswer> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let url = format!("{}/rag/query", self.config.rag_base_url());
        let body = QueryRequest {
            query: trimmed.to_string(),
            top_k: self.config.top_k(),
            enforce_policy: self.config.enforce_policy(),
        };

        let request = async {
            tracing::debug!(%url, "dispatching query");
            let response = self.http.post(&url).json(&body).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Status { status });
            }
            Ok(response.json::<RagAnswer>().await?)
        };

        if let Some(timeout) = self.config.timeout() {
            with_timeout(timeout, request).await
        } else {
            request.await
        }
    }

    /// Look up the attachments of a board post.
    ///
    /// Used when a citation carrying a `post_id` is activated; citations
    /// without one have nothing to look up.
    pub async fn attachments(&self, post_id: &PostId) -> Result<Vec<Attachment>> {
        let url = format!(
            "{}/posts/{}/attachments",
            self.config.etl_base_url(),
            post_id
        );

        tracing::debug!(%url, "fetching attachments");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        let list = response.json::<AttachmentList>().await?;
        Ok(list.attachments)
    }

    /// Submit a verdict on an answer. Fire-and-forget: the response body
    /// is ignored, only acceptance is checked.
    pub async fn send_feedback(&self, feedback: &Feedback) -> Result<()> {
        let url = format!("{}/feedback", self.config.rag_base_url());

        tracing::debug!(%url, vote = %feedback.vote, "submitting feedback");
        let response = self.http.post(&url).json(feedback).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }
        Ok(())
    }
}

/// Builder for [`ChatClient`].
///
/// This wraps [`ClientConfigBuilder`] and builds directly into a
/// [`ChatClient`].
///
/// # Example
///
/// ```
/// use ragchat::ChatClient;
///
/// let client = ChatClient::builder()
///     .rag_base_url("http://rag.internal:8001")
///     .top_k(12)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    inner: ClientConfigBuilder,
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self {
            inner: ClientConfigBuilder::default(),
        }
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (empty or
    /// non-http base URL, zero `top_k`).
    pub fn build(self) -> Result<ChatClient> {
        let config = self.inner.build()?;
        Ok(ChatClient::with_config(config))
    }

    /// Set the base URL of the RAG query service.
    pub fn rag_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.rag_base_url(url);
        self
    }

    /// Set the base URL of the board/ETL service.
    pub fn etl_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.etl_base_url(url);
        self
    }

    /// Read base URLs from the environment where not explicitly set.
    pub fn base_urls_from_env(mut self) -> Self {
        self.inner = self.inner.base_urls_from_env();
        self
    }

    /// Set how many retrieval candidates the backend considers.
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.inner = self.inner.top_k(top_k);
        self
    }

    /// Enable or disable the backend's policy guard.
    pub fn enforce_policy(mut self, enforce: bool) -> Self {
        self.inner = self.inner.enforce_policy(enforce);
        self
    }

    /// Timeout for the collecting convenience methods.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.inner = self.inner.timeout(duration);
        self
    }

    /// Register an observer called during stream processing.
    pub fn observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.inner = self.inner.observer(observer);
        self
    }
}
