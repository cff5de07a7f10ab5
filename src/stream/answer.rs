//! Answer stream implementation.
//!
//! This module provides [`AnswerStream`], which implements
//! [`futures::Stream`] to yield [`StreamEvent`]s from a streaming query's
//! response body.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use tokio::time::timeout as tokio_timeout;

use super::decoder::EventBuffer;
use super::events::{StreamEvent, StreamState};
use crate::observer::StreamObserver;
use crate::session::Shared;
use crate::{Error, Result};

/// The chunked response body as consumed by [`AnswerStream`].
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A stream of events from one in-flight query.
///
/// Polling the stream drives the whole turn: chunks are read one at a
/// time, each chunk is decoded and applied to the session transcript in
/// full before the next chunk is requested, and the decoded events are
/// yielded in wire order.
///
/// # Cancellation
///
/// The session's [`stop`](crate::ChatSession::stop) flag is checked each
/// time the stream would otherwise await the next chunk. On
/// cancellation the connection is dropped rather than drained, any
/// buffered undelimited fragment is discarded, and a final
/// [`StreamEvent::Aborted`] is yielded. Completion that has already been
/// observed wins over a later stop; a stop delivered first wins over
/// completion. Dropping a live `AnswerStream` likewise aborts the turn.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use ragchat::StreamEvent;
///
/// let mut stream = session.send("what changed in Q3?").await?;
/// while let Some(event) = stream.next().await {
///     match event? {
///         StreamEvent::Delta { text } => print!("{}", text),
///         StreamEvent::Citations(c) => eprintln!("[{} sources]", c.len()),
///         other if other.is_terminal() => break,
///         _ => {}
///     }
/// }
/// ```
pub struct AnswerStream {
    /// The response body; `None` once the turn reached a terminal state.
    chunks: Option<ChunkStream>,
    decoder: EventBuffer,
    /// Decoded events already applied to the transcript, awaiting yield.
    pending: VecDeque<StreamEvent>,
    shared: Arc<Shared>,
    observer: Option<Arc<dyn StreamObserver>>,
}

impl AnswerStream {
    /// Create a stream over an established response body.
    pub(crate) fn new(
        chunks: ChunkStream,
        shared: Arc<Shared>,
        observer: Option<Arc<dyn StreamObserver>>,
    ) -> Self {
        Self {
            chunks: Some(chunks),
            decoder: EventBuffer::new(),
            pending: VecDeque::new(),
            shared,
            observer,
        }
    }

    /// Current lifecycle state of the turn.
    pub fn state(&self) -> StreamState {
        self.shared.state()
    }

    /// Apply decoded events to the transcript and queue them for yield.
    fn apply(&mut self, events: Vec<StreamEvent>) {
        for event in events {
            match &event {
                StreamEvent::Delta { text } => {
                    self.shared.apply_delta(text);
                    if let Some(obs) = &self.observer {
                        obs.on_delta(text);
                    }
                }
                StreamEvent::Citations(citations) => {
                    self.shared.replace_citations(citations.clone());
                    if let Some(obs) = &self.observer {
                        obs.on_citations(citations);
                    }
                }
                StreamEvent::Completed | StreamEvent::Aborted => {}
            }
            self.pending.push_back(event);
        }
    }

    /// Transition to a non-failed terminal state, returning the event to
    /// yield. Dropping the body aborts the connection rather than
    /// draining it.
    fn finish(&mut self, state: StreamState) -> StreamEvent {
        self.chunks = None;
        self.decoder.clear();
        self.shared.set_state(state);
        if let Some(obs) = &self.observer {
            obs.on_finished(state);
        }
        if state == StreamState::Completed {
            StreamEvent::Completed
        } else {
            StreamEvent::Aborted
        }
    }

    /// Transition to `Failed`, recording the surfaced message. Applied
    /// transcript content is retained.
    fn fail(&mut self, error: &Error) {
        self.chunks = None;
        self.decoder.clear();
        self.shared.fail(error);
        if let Some(obs) = &self.observer {
            obs.on_finished(StreamState::Failed);
        }
    }

    /// Drive the stream to its terminal state, returning the
    /// concatenation of all text deltas.
    ///
    /// On cancellation mid-stream this returns the partial text; on a
    /// transport error it returns the error (the partial content stays
    /// in the transcript either way).
    pub async fn collect_text(mut self) -> Result<String> {
        use futures::StreamExt;

        let mut text = String::new();
        while let Some(event) = self.next().await {
            if let StreamEvent::Delta { text: t } = event? {
                text.push_str(&t);
            }
        }
        Ok(text)
    }
}

impl Stream for AnswerStream {
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            // Events already applied are yielded before anything else so
            // consumers observe them in wire order.
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            let Some(chunks) = this.chunks.as_mut() else {
                return Poll::Ready(None);
            };

            // The cancellation flag is checked each time the loop would
            // otherwise await the next chunk.
            if this.shared.is_cancelled() {
                let event = this.finish(StreamState::Aborted);
                return Poll::Ready(Some(Ok(event)));
            }

            match chunks.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => match this.decoder.push(&bytes) {
                    Ok(events) => this.apply(events),
                    Err(e) => {
                        this.fail(&e);
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    this.fail(&e);
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    let event = this.finish(StreamState::Completed);
                    return Poll::Ready(Some(Ok(event)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for AnswerStream {
    fn drop(&mut self) {
        // An abandoned live turn is an abort, not a completion.
        if self.chunks.is_some() && self.shared.state().is_streaming() {
            self.shared.set_state(StreamState::Aborted);
            if let Some(obs) = &self.observer {
                obs.on_finished(StreamState::Aborted);
            }
        }
    }
}

/// Run a future with a timeout.
///
/// Returns an error if the future doesn't complete within the specified
/// duration.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio_timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(duration)),
    }
}
