use std::time::Duration;

/// Errors that can occur when using ragchat.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Request validation errors: rejected before any network effect
/// - Transport errors: HTTP or stream-level failures
/// - Runtime errors: failures during execution
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected at build() time)
    // -------------------------------------------------------------------------
    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Request validation errors (rejected before any network effect)
    // -------------------------------------------------------------------------
    /// The query was empty after trimming whitespace.
    #[error("query is empty")]
    EmptyQuery,

    /// A send was attempted while a stream is already in flight.
    ///
    /// A session admits one outstanding query at a time; wait for the
    /// current stream to reach a terminal state or call
    /// [`stop`](crate::ChatSession::stop) first.
    #[error("a stream is already in flight for this session")]
    Busy,

    // -------------------------------------------------------------------------
    // Transport errors
    // -------------------------------------------------------------------------
    /// HTTP-level failure: connection, request build, or body read.
    #[error("transport error: {0}")]
    Http(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Status {
        /// The status code returned by the server.
        status: reqwest::StatusCode,
    },

    /// The response body contained bytes that are not valid UTF-8.
    #[error("response stream is not valid UTF-8")]
    Utf8(#[source] std::str::Utf8Error),

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// Request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// A specialized Result type for ragchat operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error terminated a stream at the transport level.
    ///
    /// Transport errors leave the session in the `Failed` state with
    /// already-applied transcript content retained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. } | Error::Utf8(_))
    }

    /// Check if this error was rejected before any network effect.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::EmptyQuery | Error::Busy)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}
