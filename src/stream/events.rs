//! High-level streaming events for consumers.
//!
//! This module provides the [`StreamEvent`] enum, representing meaningful
//! moments in a streamed answer, and [`StreamState`], the lifecycle of a
//! single query.

use std::fmt;

use crate::protocol::Citation;

/// Lifecycle of one streamed query.
///
/// The state moves `Idle → Streaming` on send and from `Streaming` to
/// exactly one of the terminal states. A session admits a new send only
/// when the state is `Idle` or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamState {
    /// No query has been issued yet.
    #[default]
    Idle,
    /// A query is in flight and the open message is receiving events.
    Streaming,
    /// The stream ended naturally; the open message is frozen.
    Completed,
    /// The stream was cancelled by the caller; partial content retained.
    Aborted,
    /// The stream ended on a transport error; partial content retained.
    Failed,
}

impl StreamState {
    /// Check whether this state ends a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamState::Completed | StreamState::Aborted | StreamState::Failed
        )
    }

    /// Check whether a stream is currently in flight.
    pub fn is_streaming(&self) -> bool {
        *self == StreamState::Streaming
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Idle => write!(f, "idle"),
            StreamState::Streaming => write!(f, "streaming"),
            StreamState::Completed => write!(f, "completed"),
            StreamState::Aborted => write!(f, "aborted"),
            StreamState::Failed => write!(f, "failed"),
        }
    }
}

/// A high-level streaming event for consumers.
///
/// Events are yielded in the exact order their frames were delimited on
/// the wire; by the time a consumer sees one, the corresponding
/// transcript mutation has already been applied.
///
/// # Event Order
///
/// 1. `Delta` / `Citations` — incremental content as it arrives
/// 2. `Completed` or `Aborted` — exactly one, last on a non-failed stream
///
/// A transport failure yields a single `Err` instead of a terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment appended to the open assistant message.
    Delta {
        /// The text fragment, exactly as carried by the event payload.
        text: String,
    },

    /// The open assistant message's citations were replaced.
    ///
    /// Each citation event is an authoritative replacement of the prior
    /// list, never a merge.
    Citations(Vec<Citation>),

    /// The stream ended naturally. Always last on success.
    Completed,

    /// The stream was cancelled via [`stop`](crate::ChatSession::stop)
    /// or by dropping the stream. Always last on cancellation.
    Aborted,
}

impl StreamEvent {
    /// Check if this is a text delta event.
    pub fn is_delta(&self) -> bool {
        matches!(self, StreamEvent::Delta { .. })
    }

    /// Check if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Aborted)
    }

    /// Get text from a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta { text } => Some(text),
            _ => None,
        }
    }

    /// Get the citation list if this is a Citations event.
    pub fn citations(&self) -> Option<&[Citation]> {
        match self {
            StreamEvent::Citations(c) => Some(c),
            _ => None,
        }
    }
}
