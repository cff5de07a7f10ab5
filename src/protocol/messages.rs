//! Request and response bodies for the backend endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::sources::Citation;

/// Body of a query against the RAG backend, streaming or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
    /// How many retrieval candidates the backend should consider.
    pub top_k: u32,
    /// Whether the backend applies its PII/refusal policy to the answer.
    pub enforce_policy: bool,
}

/// Policy verdict attached to a completed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Policy {
    /// The backend refused to answer.
    #[serde(default)]
    pub refusal: bool,
    /// Parts of the answer were masked.
    #[serde(default)]
    pub masked: bool,
    /// PII categories that triggered masking.
    #[serde(default)]
    pub pii_types: Vec<String>,
    /// Human-readable explanation, empty when nothing triggered.
    #[serde(default)]
    pub reason: String,
}

impl Policy {
    /// Check whether the policy altered or blocked the answer.
    pub fn intervened(&self) -> bool {
        self.refusal || self.masked
    }
}

/// Response of the non-streaming query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RagAnswer {
    /// The complete answer text.
    pub answer: String,
    /// Sources backing the answer.
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Policy verdict for the answer.
    #[serde(default)]
    pub policy: Policy,
}

/// Caller's verdict on an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    /// The answer was helpful.
    Up,
    /// The answer was wrong or unhelpful.
    Down,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Up => write!(f, "up"),
            Vote::Down => write!(f, "down"),
        }
    }
}

/// Body of the fire-and-forget feedback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    /// The query the answer responded to.
    pub query: String,
    /// The answer being rated.
    pub answer: String,
    /// Citations the answer carried.
    pub citations: Vec<Citation>,
    /// Policy verdict, when one was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    /// The caller's verdict.
    pub vote: Vote,
}
