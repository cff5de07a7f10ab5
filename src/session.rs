//! Conversation sessions over the streaming query endpoint.
//!
//! This module provides [`ChatSession`], which owns one conversation's
//! transcript and the lifecycle of its in-flight query. The session
//! appends a user/assistant message pair per turn, applies streamed
//! events to the open assistant message, and exposes cancellation and
//! read-only snapshots.
//!
//! # Example
//!
//! ```ignore
//! use ragchat::{ChatClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ChatClient::new()?;
//!     let session = client.session();
//!
//!     let answer = session.send_and_collect("who approved the budget?").await?;
//!     println!("{}", answer);
//!
//!     // The transcript now holds both sides of the turn.
//!     assert_eq!(session.transcript().len(), 2);
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use futures::{Stream, TryStreamExt};

use crate::config::ClientConfig;
use crate::protocol::QueryRequest;
use crate::stream::{with_timeout, AnswerStream, StreamState};
use crate::transcript::{Message, Transcript};
use crate::{Error, Result};

/// State shared between a session and its in-flight answer stream.
pub(crate) struct Shared {
    transcript: RwLock<Transcript>,
    state: RwLock<StreamState>,
    /// Human-readable message of the most recent failure.
    error: RwLock<Option<String>>,
    cancelled: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            transcript: RwLock::new(Transcript::new()),
            state: RwLock::new(StreamState::Idle),
            error: RwLock::new(None),
            cancelled: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> StreamState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, state: StreamState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Record a failure: terminal state plus the single surfaced message.
    pub(crate) fn fail(&self, error: &Error) {
        *self.error.write().unwrap_or_else(PoisonError::into_inner) = Some(error.to_string());
        self.set_state(StreamState::Failed);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn apply_delta(&self, text: &str) {
        self.transcript
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply_delta(text);
    }

    pub(crate) fn replace_citations(&self, citations: Vec<crate::protocol::Citation>) {
        self.transcript
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace_citations(citations);
    }

    /// Admit a new turn.
    ///
    /// Checks admission and applies the transcript mutation under the
    /// state lock so a concurrent send cannot open a second assistant
    /// message.
    fn begin_turn(&self, query: &str) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_streaming() {
            return Err(Error::Busy);
        }
        *state = StreamState::Streaming;
        self.transcript
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .begin_turn(query);
        *self.error.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.cancelled.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A conversation with the streaming RAG backend.
///
/// The session exclusively owns its transcript: consumers read cloned
/// snapshots via [`transcript`](Self::transcript) and never mutate
/// history directly. One query may be in flight at a time; a concurrent
/// [`send`](Self::send) is rejected with [`Error::Busy`]. Independent
/// conversations are independent `ChatSession` instances.
pub struct ChatSession {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    shared: Arc<Shared>,
}

impl ChatSession {
    pub(crate) fn new(config: Arc<ClientConfig>, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            shared: Arc::new(Shared::new()),
        }
    }

    /// Create a standalone session from a configuration.
    ///
    /// Prefer [`ChatClient::session`](crate::ChatClient::session) when
    /// also using the collaborator endpoints; this constructor is for
    /// callers that only stream.
    pub fn with_config(config: ClientConfig) -> Self {
        Self::new(Arc::new(config), reqwest::Client::new())
    }

    /// Send a query and return a stream of answer events.
    ///
    /// Appends the user message and an empty open assistant message,
    /// then dispatches `POST /rag/stream`. The returned
    /// [`AnswerStream`] must be polled to drive the turn.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`] if the query is empty after trimming;
    ///   the transcript is untouched.
    /// - [`Error::Busy`] if a stream is already in flight; the
    ///   transcript is untouched.
    /// - A transport error if dispatch fails or the server answers with
    ///   a non-success status; the turn ends in
    ///   [`StreamState::Failed`] with the open message retained empty.
    pub async fn send(&self, query: &str) -> Result<AnswerStream> {
        let query = normalize_query(query)?;
        self.shared.begin_turn(&query)?;

        match self.dispatch(&query).await {
            Ok(chunks) => Ok(self.attach(chunks)),
            Err(e) => {
                self.shared.fail(&e);
                if let Some(obs) = self.config.observer() {
                    obs.on_finished(StreamState::Failed);
                }
                Err(e)
            }
        }
    }

    /// Begin a turn over an already-established response body.
    ///
    /// Performs the same validation and transcript bookkeeping as
    /// [`send`](Self::send) without dispatching a request. This is the
    /// seam for alternate transports and for tests that feed the stream
    /// from pre-built chunks.
    pub fn send_with_source<S>(&self, query: &str, source: S) -> Result<AnswerStream>
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        let query = normalize_query(query)?;
        self.shared.begin_turn(&query)?;
        Ok(self.attach(Box::pin(source)))
    }

    /// Send a query and collect the complete answer text.
    ///
    /// Drives the stream to its terminal state, honoring the configured
    /// timeout.
    pub async fn send_and_collect(&self, query: &str) -> Result<String> {
        let stream = self.send(query).await?;

        if let Some(timeout) = self.config.timeout() {
            with_timeout(timeout, stream.collect_text()).await
        } else {
            stream.collect_text().await
        }
    }

    /// Cancel the in-flight stream, if any.
    ///
    /// The read loop observes the signal at its next suspension point,
    /// aborts the connection, and ends the turn in
    /// [`StreamState::Aborted`] with the partial content retained.
    /// Calling stop when idle is a no-op; calling it twice has the same
    /// effect as once.
    pub fn stop(&self) {
        if self.shared.state().is_streaming() {
            self.shared.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// Snapshot of the transcript, oldest message first.
    pub fn transcript(&self) -> Vec<Message> {
        self.shared
            .transcript
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages()
            .to_vec()
    }

    /// The most recent assistant message, if any.
    pub fn last_answer(&self) -> Option<Message> {
        self.shared
            .transcript
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages()
            .iter()
            .rev()
            .find(|m| m.is_assistant())
            .cloned()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.shared.state()
    }

    /// Check whether a stream is in flight.
    pub fn is_streaming(&self) -> bool {
        self.shared.state().is_streaming()
    }

    /// Human-readable message of the most recent failure, if the last
    /// turn ended in [`StreamState::Failed`].
    pub fn last_error(&self) -> Option<String> {
        self.shared
            .error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn attach(&self, chunks: crate::stream::ChunkStream) -> AnswerStream {
        AnswerStream::new(
            chunks,
            Arc::clone(&self.shared),
            self.config.observer().cloned(),
        )
    }

    async fn dispatch(&self, query: &str) -> Result<crate::stream::ChunkStream> {
        let url = format!("{}/rag/stream", self.config.rag_base_url());
        let body = QueryRequest {
            query: query.to_string(),
            top_k: self.config.top_k(),
            enforce_policy: self.config.enforce_policy(),
        };

        tracing::debug!(%url, "dispatching streaming query");
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        Ok(Box::pin(response.bytes_stream().map_err(Error::from)))
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("state", &self.state())
            .field("messages", &self.transcript().len())
            .finish()
    }
}

/// Trim the query and reject an empty one before any other effect.
fn normalize_query(query: &str) -> Result<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyQuery);
    }
    Ok(trimmed.to_string())
}
