//! Stream observer trait and implementations.

use crate::protocol::Citation;
use crate::stream::StreamState;

/// Observer for streaming events.
///
/// Implementations receive callbacks as the session applies stream
/// events to the transcript. This is for observation only (rendering,
/// metrics); the transcript is mutated by the session alone.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; blocking delays stream processing.
/// - Methods have default empty implementations for selective observation.
/// - Observers are called synchronously during stream processing, after
///   the corresponding transcript mutation has been applied.
pub trait StreamObserver: Send + Sync {
    /// Called when a text delta has been appended to the open message.
    fn on_delta(&self, text: &str) {
        let _ = text;
    }

    /// Called when the open message's citations have been replaced.
    fn on_citations(&self, citations: &[Citation]) {
        let _ = citations;
    }

    /// Called once when the stream reaches a terminal state.
    fn on_finished(&self, state: StreamState) {
        let _ = state;
    }
}

/// Simple observer that logs stream events using tracing.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ragchat::{ClientConfig, LoggingObserver};
///
/// let config = ClientConfig::builder()
///     .observer(Arc::new(LoggingObserver::new()))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    level: LogLevel,
}

/// Log level for LoggingObserver.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Log at trace level.
    Trace,
    /// Log at debug level (default).
    #[default]
    Debug,
    /// Log at info level.
    Info,
}

impl LoggingObserver {
    /// Create a new logging observer with debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging observer with a specific level.
    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

impl StreamObserver for LoggingObserver {
    fn on_delta(&self, text: &str) {
        match self.level {
            LogLevel::Trace => tracing::trace!(len = text.len(), "delta"),
            LogLevel::Debug => tracing::debug!(len = text.len(), "delta"),
            LogLevel::Info => tracing::info!(len = text.len(), "delta"),
        }
    }

    fn on_citations(&self, citations: &[Citation]) {
        match self.level {
            LogLevel::Trace => tracing::trace!(count = citations.len(), "citations"),
            LogLevel::Debug => tracing::debug!(count = citations.len(), "citations"),
            LogLevel::Info => tracing::info!(count = citations.len(), "citations"),
        }
    }

    fn on_finished(&self, state: StreamState) {
        match self.level {
            LogLevel::Trace => tracing::trace!(?state, "stream finished"),
            LogLevel::Debug => tracing::debug!(?state, "stream finished"),
            LogLevel::Info => tracing::info!(?state, "stream finished"),
        }
    }
}
