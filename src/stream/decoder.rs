//! Incremental decoder for the SSE response body.
//!
//! The response body arrives as raw byte chunks whose boundaries are not
//! aligned with character or event boundaries. [`EventBuffer`] owns the
//! two layers of buffering that make this safe:
//!
//! 1. A byte carry for a UTF-8 code point split across chunks.
//! 2. A text buffer holding decoded output until a frame delimiter
//!    (blank line) is observed. A frame is never classified before its
//!    terminating delimiter has been seen, so a delta can never be
//!    applied truncated.
//!
//! Classification is by content, not by event markers: a `data:` payload
//! that parses as a JSON citation array replaces the open message's
//! citations; any other `data:` payload is a verbatim text delta. The
//! `event: citations` marker line is informational only.

use crate::protocol::Citation;
use crate::stream::events::StreamEvent;
use crate::{Error, Result};

/// Frames are separated by a blank line.
const FRAME_DELIMITER: &str = "\n\n";

/// Field prefix of payload lines; an optional single space may follow.
const DATA_PREFIX: &str = "data:";

/// Marker announcing that a citation payload follows. Carries no
/// behavior of its own.
const CITATIONS_MARKER: &str = "event: citations";

/// Buffering state machine that turns byte chunks into [`StreamEvent`]s.
#[derive(Debug, Default)]
pub struct EventBuffer {
    /// Undecoded byte carry; holds at most one incomplete code point
    /// between pushes.
    raw: Vec<u8>,
    /// Decoded text awaiting a frame delimiter.
    text: String,
}

impl EventBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the response body.
    ///
    /// Returns every event whose terminating delimiter was observed, in
    /// wire order. Events from frames that are still incomplete stay
    /// buffered for the next push.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Utf8`] when the body contains a byte sequence
    /// that can never decode (as opposed to a code point merely split
    /// across chunks, which is carried over).
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.raw.extend_from_slice(chunk);

        let consumed = match std::str::from_utf8(&self.raw) {
            Ok(s) => {
                self.text.push_str(s);
                self.raw.len()
            }
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(Error::Utf8(e));
                }
                // Incomplete trailing code point; decode the valid prefix
                // and carry the tail.
                let valid = e.valid_up_to();
                match std::str::from_utf8(&self.raw[..valid]) {
                    Ok(s) => self.text.push_str(s),
                    Err(e) => return Err(Error::Utf8(e)),
                }
                valid
            }
        };
        self.raw.drain(..consumed);

        let mut events = Vec::new();
        while let Some(pos) = self.text.find(FRAME_DELIMITER) {
            let frame: String = self
                .text
                .drain(..pos + FRAME_DELIMITER.len())
                .collect();
            if let Some(event) = classify(&frame[..pos]) {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// The undelimited remainder currently buffered.
    ///
    /// At end of stream this fragment is discarded, never applied.
    pub fn pending(&self) -> &str {
        &self.text
    }

    /// Discard all buffered state.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.text.clear();
    }
}

/// Classify one complete frame.
///
/// Returns `None` for frames that carry no behavior: keep-alives, bare
/// citation markers, and unrecognized event types.
fn classify(frame: &str) -> Option<StreamEvent> {
    if frame.trim().is_empty() {
        // Keep-alive.
        return None;
    }

    // Trim frame boundaries only: leading whitespace and trailing line
    // breaks. Trailing spaces inside a delta payload are significant.
    let frame = frame
        .trim_start()
        .trim_end_matches(|c| c == '\n' || c == '\r');

    if let Some(payload) = strip_data_prefix(frame) {
        return classify_payload(payload);
    }

    if frame.starts_with(CITATIONS_MARKER) {
        // The marker itself is inert; honor a data line embedded in the
        // same frame by content, exactly as if it stood alone.
        for line in frame.lines().skip(1) {
            if let Some(payload) = strip_data_prefix(line.trim()) {
                return classify_payload(payload);
            }
        }
        return None;
    }

    tracing::debug!(frame, "ignoring unrecognized event");
    None
}

/// Strip `data:` and at most one following space.
fn strip_data_prefix(s: &str) -> Option<&str> {
    let rest = s.strip_prefix(DATA_PREFIX)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// A payload shaped like a JSON array is a citation update; anything
/// else is a verbatim text delta.
fn classify_payload(payload: &str) -> Option<StreamEvent> {
    if payload.trim_start().starts_with('[') {
        match serde_json::from_str::<Vec<Citation>>(payload) {
            Ok(citations) => Some(StreamEvent::Citations(citations)),
            Err(error) => {
                tracing::warn!(%error, "dropping malformed citation payload");
                None
            }
        }
    } else {
        Some(StreamEvent::Delta {
            text: payload.to_string(),
        })
    }
}
