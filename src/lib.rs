//! # ragchat
//!
//! Async Rust client for a streaming retrieval-augmented chat service.
//!
//! The core of this crate is an incremental consumer for the backend's
//! SSE answer stream: a session that owns a conversation transcript,
//! decodes interleaved text deltas and citation updates correctly under
//! arbitrary chunk boundaries, and supports cancellation mid-stream.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ragchat::{ChatClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ChatClient::new()?;
//!     let session = client.session();
//!     let answer = session.send_and_collect("who approved the budget?").await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```ignore
//! use futures::StreamExt;
//! use ragchat::{ChatClient, StreamEvent};
//!
//! let client = ChatClient::new()?;
//! let session = client.session();
//! let mut stream = session.send("summarize the outage report").await?;
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         StreamEvent::Delta { text } => print!("{}", text),
//!         StreamEvent::Citations(citations) => {
//!             eprintln!("\n{} sources", citations.len());
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Cancellation
//!
//! ```ignore
//! let session = client.session();
//! let stream = session.send("a very long question").await?;
//! // ... from a UI handler:
//! session.stop();
//! // The turn ends in StreamState::Aborted; partial content is kept.
//! ```
//!
//! ## Collaborator endpoints
//!
//! ```ignore
//! // One-shot answer with citations and policy verdict
//! let answer = client.query("what changed in Q3?").await?;
//!
//! // Preview a cited board post's attachments
//! if let Some(post_id) = answer.citations[0].post_id.as_ref() {
//!     let attachments = client.attachments(post_id).await?;
//! }
//! ```

mod client;
pub mod config;
mod error;
mod observer;
pub mod protocol;
mod session;
pub mod stream;
pub mod transcript;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::{ChatClient, ClientBuilder};
pub use session::ChatSession;

// Re-export commonly used config types at crate root
pub use config::{ClientConfig, ClientConfigBuilder};

// Re-export observer types at crate root
pub use observer::{LogLevel, LoggingObserver, StreamObserver};

// Re-export commonly used protocol types at crate root
pub use protocol::{Attachment, Citation, Feedback, Policy, PostId, RagAnswer, Vote};

// Re-export commonly used stream types at crate root
pub use stream::{AnswerStream, EventBuffer, StreamEvent, StreamState};

// Re-export transcript types at crate root
pub use transcript::{Message, Role, Transcript};
