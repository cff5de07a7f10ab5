//! Configuration for the ragchat client.
//!
//! This module provides:
//!
//! - [`ClientConfig`] and [`ClientConfigBuilder`] for configuring the client
//! - Defaults and environment-variable names for the backend base URLs
//!
//! # Example
//!
//! ```
//! use ragchat::config::ClientConfig;
//!
//! // Defaults (local backends, top_k = 8, policy guard on)
//! let config = ClientConfig::builder().build().unwrap();
//!
//! // Explicit endpoints, environment as fallback
//! let config = ClientConfig::builder()
//!     .base_urls_from_env()
//!     .top_k(20)
//!     .enforce_policy(false)
//!     .build()
//!     .unwrap();
//! ```

pub mod builder;

// Re-export commonly used types
pub use builder::{
    ClientConfig, ClientConfigBuilder, DEFAULT_ETL_BASE, DEFAULT_RAG_BASE, DEFAULT_TOP_K,
    ENV_ETL_BASE, ENV_RAG_BASE,
};
