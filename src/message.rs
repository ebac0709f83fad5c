//! Message types for parley's conversation history.
//!
//! A [`Message`] is an ordered list of [`Segment`]s tagged with a [`Role`].
//! Text, tool-call requests, and tool-call results are all segments, so a
//! single responder message can carry a round's aggregated text followed by
//! the tool calls it asked for, and a single submitter message can carry every
//! result of that round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Who produced a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person (or scripted driver) typing input. Tool results are also
    /// fed back under this role.
    Submitter,
    /// The response source.
    Responder,
}

/// One semantic unit of message content. Order within a message matters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text {
        text: String,
    },
    ToolCallRequest {
        call_id: String,
        name: String,
        args: Value,
    },
    ToolCallResult {
        call_id: String,
        name: String,
        output: ToolOutput,
    },
}

/// What a tool call produced: the returned value, or an error message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolOutput {
    Success(Value),
    Error(String),
}

impl ToolOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutput::Error(_))
    }

    /// The JSON payload recorded on the tracker and shown to the response
    /// source: the value itself on success, `{"error": message}` on failure.
    pub fn to_value(&self) -> Value {
        match self {
            ToolOutput::Success(value) => value.clone(),
            ToolOutput::Error(message) => json!({ "error": message }),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub segments: Vec<Segment>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, segments: Vec<Segment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            segments,
            timestamp: Utc::now(),
        }
    }

    /// A submitter message holding a single text segment.
    pub fn submitter(text: impl Into<String>) -> Self {
        Self::new(Role::Submitter, vec![Segment::Text { text: text.into() }])
    }

    /// An empty responder message, opened at the start of every round.
    pub fn responder() -> Self {
        Self::new(Role::Responder, Vec::new())
    }

    /// A submitter message feeding a round's tool results back.
    pub fn feedback(segments: Vec<Segment>) -> Self {
        Self::new(Role::Submitter, segments)
    }

    /// Concatenated text of every text segment.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The first text segment, if the message starts with one.
    ///
    /// Submitter messages typed by a person start with text; messages that
    /// only feed tool results back do not.
    pub fn leading_text(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Text { text }) => Some(text),
            _ => None,
        }
    }

    /// Tool-call requests in this message, in order.
    pub fn tool_requests(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.segments.iter().filter_map(|s| match s {
            Segment::ToolCallRequest {
                call_id,
                name,
                args,
            } => Some((call_id.as_str(), name.as_str(), args)),
            _ => None,
        })
    }

    /// Tool-call results in this message, in order.
    pub fn tool_results(&self) -> impl Iterator<Item = (&str, &str, &ToolOutput)> {
        self.segments.iter().filter_map(|s| match s {
            Segment::ToolCallResult {
                call_id,
                name,
                output,
            } => Some((call_id.as_str(), name.as_str(), output)),
            _ => None,
        })
    }

    /// True for submitter messages that only carry tool results.
    pub fn is_tool_feedback(&self) -> bool {
        self.role == Role::Submitter
            && !self.segments.is_empty()
            && self
                .segments
                .iter()
                .all(|s| matches!(s, Segment::ToolCallResult { .. }))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Submitter => write!(f, "you"),
            Role::Responder => write!(f, "assistant"),
        }
    }
}
