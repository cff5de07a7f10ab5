//! Streaming response handling.
//!
//! This module provides the types that consume a streamed answer:
//!
//! - [`StreamEvent`] - high-level events: text deltas, citation updates,
//!   and terminal markers
//! - [`StreamState`] - the lifecycle of one query
//! - [`EventBuffer`] - the incremental decoder turning raw body chunks
//!   into events, correct under arbitrary chunk boundaries
//! - [`AnswerStream`] - an async stream of events that applies each one
//!   to the session transcript as it is decoded
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use ragchat::{ChatClient, StreamEvent};
//!
//! let client = ChatClient::new()?;
//! let session = client.session();
//!
//! let mut stream = session.send("what changed in Q3?").await?;
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
//! # Cancellation
//!
//! [`ChatSession::stop`](crate::ChatSession::stop) raises a flag that the
//! stream observes at its next suspension point; the connection is then
//! aborted rather than drained and the turn ends in
//! [`StreamState::Aborted`]. Dropping a live [`AnswerStream`] has the
//! same effect.

pub mod answer;
pub mod decoder;
pub mod events;

pub use answer::{with_timeout, AnswerStream, ChunkStream};
pub use decoder::EventBuffer;
pub use events::{StreamEvent, StreamState};
