//! Source references attached to assistant answers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Newtype for board post identifiers to prevent string mixups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    /// Create a new PostId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        PostId(id.into())
    }

    /// Get the post ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        PostId(s)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        PostId(s.to_string())
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A reference to a source document backing part of an answer.
///
/// Citations arrive on the stream as a JSON array and replace the open
/// message's previous citation list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Opaque identifier into the backend source list.
    pub id: String,
    /// Display title, if the backend resolved one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Source location string (document name plus page/sheet:cell).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Back-reference into the board post store, when the source is a post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
}

impl Citation {
    /// Check whether this citation can be previewed.
    ///
    /// Preview requires a `post_id` to look attachments up by; citations
    /// without one have no preview action.
    pub fn has_preview(&self) -> bool {
        self.post_id.is_some()
    }

    /// Display label: the title when present, the raw id otherwise.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// One attachment of a board post, as returned by the attachments lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name.
    pub filename: String,
    /// Publicly fetchable URL for the file.
    ///
    /// Some deployments return this under `url` instead of `public_url`.
    #[serde(alias = "url")]
    pub public_url: String,
    /// Content hash, when the store computed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

/// Response envelope of the attachments endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttachmentList {
    /// The post's attachments, possibly empty.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}
