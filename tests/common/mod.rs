//! Test utilities for ragchat integration tests.

use bytes::Bytes;
use futures::{stream, Stream};
use ragchat::protocol::Citation;
use ragchat::{Error, Result};

/// Builder for assembling realistic SSE response bodies.
///
/// Frames are appended in order, each terminated by the blank-line
/// delimiter, and the finished body is split into chunks by the test.
pub struct ScenarioBuilder {
    body: String,
}

impl ScenarioBuilder {
    /// Create an empty scenario.
    pub fn new() -> Self {
        Self {
            body: String::new(),
        }
    }

    /// Append a text-delta frame.
    pub fn delta(mut self, text: &str) -> Self {
        self.body.push_str("data: ");
        self.body.push_str(text);
        self.body.push_str("\n\n");
        self
    }

    /// Append a citation marker frame followed by a citation data frame,
    /// the way the backend announces citation updates.
    pub fn citations(mut self, json_array: &str) -> Self {
        self.body.push_str("event: citations\n\n");
        self.body.push_str("data: ");
        self.body.push_str(json_array);
        self.body.push_str("\n\n");
        self
    }

    /// Append an arbitrary frame (terminated by the delimiter).
    pub fn raw(mut self, frame: &str) -> Self {
        self.body.push_str(frame);
        self.body.push_str("\n\n");
        self
    }

    /// Append an empty keep-alive frame.
    pub fn keepalive(mut self) -> Self {
        self.body.push_str("\n\n");
        self
    }

    /// The assembled body.
    pub fn body(self) -> String {
        self.body
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole body as one chunk.
pub fn single_chunk(body: &str) -> Vec<Bytes> {
    vec![Bytes::copy_from_slice(body.as_bytes())]
}

/// The body cut into fixed-size byte chunks, ignoring character and
/// frame boundaries.
pub fn byte_chunks(body: &str, size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(size)
        .map(Bytes::copy_from_slice)
        .collect()
}

/// A well-behaved chunk source that ends after the last chunk.
pub fn source(chunks: Vec<Bytes>) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
    stream::iter(chunks.into_iter().map(Ok))
}

/// A chunk source that delivers its chunks and then fails with an
/// HTTP 500 transport error.
pub fn failing_source(chunks: Vec<Bytes>) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
    let items: Vec<Result<Bytes>> = chunks
        .into_iter()
        .map(Ok)
        .chain(std::iter::once(Err(Error::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        })))
        .collect();
    stream::iter(items)
}

/// A minimal citation with only an id.
pub fn citation(id: &str) -> Citation {
    Citation {
        id: id.into(),
        title: None,
        source: None,
        post_id: None,
    }
}
