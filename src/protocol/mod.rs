//! Wire types for the backend endpoints.
//!
//! This module defines the JSON bodies exchanged with the two backend
//! services: the RAG query service (streaming and one-shot answers,
//! feedback) and the board/ETL service (attachment lookup).
//!
//! # Example
//!
//! ```
//! use ragchat::protocol::Citation;
//!
//! let json = r#"[{"id": "doc:7", "title": "Handbook", "post_id": "p-3"}]"#;
//! let citations: Vec<Citation> = serde_json::from_str(json).unwrap();
//!
//! assert!(citations[0].has_preview());
//! assert_eq!(citations[0].label(), "Handbook");
//! ```

mod messages;
mod sources;

// Re-export all public types
pub use messages::{Feedback, Policy, QueryRequest, RagAnswer, Vote};
pub use sources::{Attachment, AttachmentList, Citation, PostId};
