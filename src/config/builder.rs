//! Client configuration and builder.
//!
//! This module provides the builder pattern for configuring the ragchat
//! client.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ragchat::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .rag_base_url("http://rag.internal:8001")
//!     .etl_base_url("http://etl.internal:8002")
//!     .top_k(12)
//!     .timeout(Duration::from_secs(60))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.top_k(), 12);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::observer::StreamObserver;
use crate::{Error, Result};

/// Default base URL of the RAG query service.
pub const DEFAULT_RAG_BASE: &str = "http://localhost:8001";

/// Default base URL of the board/ETL service (attachment lookup).
pub const DEFAULT_ETL_BASE: &str = "http://localhost:8002";

/// Default number of retrieval candidates per query.
pub const DEFAULT_TOP_K: u32 = 8;

/// Environment variable overriding the RAG service base URL.
pub const ENV_RAG_BASE: &str = "RAGCHAT_RAG_BASE";

/// Environment variable overriding the ETL service base URL.
pub const ENV_ETL_BASE: &str = "RAGCHAT_ETL_BASE";

/// Configuration for the ragchat client.
///
/// Use [`ClientConfig::builder()`] to create a new configuration.
#[derive(Clone)]
pub struct ClientConfig {
    // Endpoints
    pub(crate) rag_base_url: String,
    pub(crate) etl_base_url: String,

    // Query shaping
    pub(crate) top_k: u32,
    pub(crate) enforce_policy: bool,

    // Runtime options
    pub(crate) timeout: Option<Duration>,
    pub(crate) observer: Option<Arc<dyn StreamObserver>>,
}

impl ClientConfig {
    /// Create a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Base URL of the RAG query service, without a trailing slash.
    pub fn rag_base_url(&self) -> &str {
        &self.rag_base_url
    }

    /// Base URL of the board/ETL service, without a trailing slash.
    pub fn etl_base_url(&self) -> &str {
        &self.etl_base_url
    }

    /// Number of retrieval candidates requested per query.
    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Whether the backend applies its policy guard to answers.
    pub fn enforce_policy(&self) -> bool {
        self.enforce_policy
    }

    /// Timeout applied by the collecting convenience methods, if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The configured stream observer, if any.
    pub fn observer(&self) -> Option<&Arc<dyn StreamObserver>> {
        self.observer.as_ref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rag_base_url", &self.rag_base_url)
            .field("etl_base_url", &self.etl_base_url)
            .field("top_k", &self.top_k)
            .field("enforce_policy", &self.enforce_policy)
            .field("timeout", &self.timeout)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Builder for [`ClientConfig`].
///
/// The builder validates the configuration when
/// [`build()`](ClientConfigBuilder::build) is called.
#[derive(Clone, Default)]
pub struct ClientConfigBuilder {
    rag_base_url: Option<String>,
    etl_base_url: Option<String>,
    top_k: Option<u32>,
    enforce_policy: Option<bool>,
    timeout: Option<Duration>,
    observer: Option<Arc<dyn StreamObserver>>,
}

impl ClientConfigBuilder {
    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// Set the base URL of the RAG query service.
    pub fn rag_base_url(mut self, url: impl Into<String>) -> Self {
        self.rag_base_url = Some(url.into());
        self
    }

    /// Set the base URL of the board/ETL service.
    pub fn etl_base_url(mut self, url: impl Into<String>) -> Self {
        self.etl_base_url = Some(url.into());
        self
    }

    /// Read base URLs from `RAGCHAT_RAG_BASE` / `RAGCHAT_ETL_BASE`.
    ///
    /// Explicitly set URLs win over the environment; unset variables
    /// leave the defaults in place.
    pub fn base_urls_from_env(mut self) -> Self {
        if self.rag_base_url.is_none() {
            if let Ok(url) = std::env::var(ENV_RAG_BASE) {
                self.rag_base_url = Some(url);
            }
        }
        if self.etl_base_url.is_none() {
            if let Ok(url) = std::env::var(ENV_ETL_BASE) {
                self.etl_base_url = Some(url);
            }
        }
        self
    }

    // -------------------------------------------------------------------------
    // Query shaping
    // -------------------------------------------------------------------------

    /// Set how many retrieval candidates the backend considers per query.
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Enable or disable the backend's policy guard.
    pub fn enforce_policy(mut self, enforce: bool) -> Self {
        self.enforce_policy = Some(enforce);
        self
    }

    // -------------------------------------------------------------------------
    // Runtime options
    // -------------------------------------------------------------------------

    /// Timeout for the collecting convenience methods.
    ///
    /// Streaming consumption itself is unbounded; the timeout applies to
    /// [`send_and_collect`](crate::ChatSession::send_and_collect) and
    /// [`query`](crate::ChatClient::query).
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Register an observer called during stream processing.
    pub fn observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when a base URL is empty or not
    /// http(s), or when `top_k` is zero.
    pub fn build(self) -> Result<ClientConfig> {
        let rag_base_url = normalize_base_url(
            self.rag_base_url.as_deref().unwrap_or(DEFAULT_RAG_BASE),
            "rag_base_url",
        )?;
        let etl_base_url = normalize_base_url(
            self.etl_base_url.as_deref().unwrap_or(DEFAULT_ETL_BASE),
            "etl_base_url",
        )?;

        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".into()));
        }

        Ok(ClientConfig {
            rag_base_url,
            etl_base_url,
            top_k,
            enforce_policy: self.enforce_policy.unwrap_or(true),
            timeout: self.timeout,
            observer: self.observer,
        })
    }
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("rag_base_url", &self.rag_base_url)
            .field("etl_base_url", &self.etl_base_url)
            .field("top_k", &self.top_k)
            .field("enforce_policy", &self.enforce_policy)
            .field("timeout", &self.timeout)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Validate a base URL and strip any trailing slash.
fn normalize_base_url(url: &str, field: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} must not be empty")));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(Error::InvalidConfig(format!(
            "{field} must start with http:// or https:// (got {trimmed:?})"
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
