//! Domain types for the pattern store
//!
//! These types are storage-agnostic. The JSON shape here is also the on-disk
//! line format of the durable log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::GuardError;

/// Maximum stored message length, in chars
pub const MAX_MESSAGE_CHARS: usize = 1000;
/// Maximum stored context length, in chars
pub const MAX_CONTEXT_CHARS: usize = 2000;

/// Closed set of observed cognitive patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Delegation,
    NoReflection,
    Repetitive,
    Vocabulary,
    Clarity,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Delegation,
        PatternKind::NoReflection,
        PatternKind::Repetitive,
        PatternKind::Vocabulary,
        PatternKind::Clarity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Delegation => "delegation",
            PatternKind::NoReflection => "no_reflection",
            PatternKind::Repetitive => "repetitive",
            PatternKind::Vocabulary => "vocabulary",
            PatternKind::Clarity => "clarity",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GuardError::invalid(format!("Unknown pattern: {}", s)))
    }
}

/// One earlier message captured as context for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousMessage {
    pub id: String,
    pub text: String,
}

/// One observed pattern event. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    pub id: String,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "pattern")]
    pub kind: PatternKind,
    pub message: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub previous_messages: Option<Vec<PreviousMessage>>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Caller input for a new record, before id/timestamp/truncation
#[derive(Debug, Clone, PartialEq)]
pub struct NewPattern {
    pub kind: PatternKind,
    pub message: String,
    pub message_id: Option<String>,
    pub previous_messages: Option<Vec<PreviousMessage>>,
    pub context: Option<String>,
    pub session_key: Option<String>,
}

impl NewPattern {
    pub fn new(kind: PatternKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            message_id: None,
            previous_messages: None,
            context: None,
            session_key: None,
        }
    }

    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn previous_messages(mut self, messages: Vec<PreviousMessage>) -> Self {
        self.previous_messages = Some(messages);
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }
}

impl PatternRecord {
    /// Build the stored form: fresh UUID, given timestamp, truncated text
    pub fn build(input: NewPattern, timestamp: DateTime<Utc>, embedding: Option<Vec<f32>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            kind: input.kind,
            message: truncate_chars(&input.message, MAX_MESSAGE_CHARS),
            message_id: input.message_id,
            previous_messages: input.previous_messages,
            context: input
                .context
                .map(|c| truncate_chars(&c, MAX_CONTEXT_CHARS)),
            session_key: input.session_key,
            embedding,
        }
    }
}

/// First `max` chars of `s`, never splitting a code point
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
