//! The response source seam.
//!
//! A [`ResponseSource`] turns a read-only [`History`] snapshot into a lazy,
//! single-use [`EventStream`] of text chunks and tool-call requests. The
//! engine consumes one stream per round, to the end, before it dispatches any
//! tool.

mod channel;
pub mod scripted;

pub use channel::{event_channel, EventSender};
pub use scripted::StoryBookSource;

use futures::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;

use crate::history::History;

/// One item of a response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Text(String),
    ToolCallRequest {
        /// Call id chosen by the source. The engine assigns one when absent.
        id: Option<String>,
        name: String,
        args: Value,
    },
}

impl Event {
    pub fn text(chunk: impl Into<String>) -> Self {
        Event::Text(chunk.into())
    }

    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        Event::ToolCallRequest {
            id: None,
            name: name.into(),
            args,
        }
    }
}

/// Faults of the stream itself, as opposed to failures of individual tools.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StreamError {
    #[error("response source failed: {0}")]
    Source(String),
    #[error("response stream closed without an end signal")]
    Interrupted,
}

pub type EventStream = BoxStream<'static, Result<Event, StreamError>>;

pub trait ResponseSource: Send + Sync {
    /// Starts a response over `history`. The returned stream is consumed
    /// exactly once.
    fn stream(&self, history: History) -> EventStream;
}

/// A stream that yields `events` in order and then ends.
#[cfg(test)]
pub fn replay(events: Vec<Event>) -> EventStream {
    use futures::StreamExt;
    futures::stream::iter(events.into_iter().map(Ok)).boxed()
}

/// A stream that faults immediately.
#[cfg(test)]
pub fn failing(message: impl Into<String>) -> EventStream {
    use futures::StreamExt;
    futures::stream::once(futures::future::ready(Err(StreamError::Source(
        message.into(),
    ))))
    .boxed()
}
