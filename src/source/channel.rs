//! Channel-fed response streams.
//!
//! A producer pushes events through an [`EventSender`] at whatever pace it
//! likes and must close the stream explicitly with [`EventSender::finish`] or
//! [`EventSender::fail`]. A sender dropped without either surfaces as
//! [`StreamError::Interrupted`] on the consuming side, so a crashed producer
//! can never look like a clean, request-free round.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Event, EventStream, StreamError};

enum Frame {
    Event(Event),
    End,
    Fault(String),
}

/// Producer half of [`event_channel`].
pub struct EventSender {
    tx: mpsc::UnboundedSender<Frame>,
}

impl EventSender {
    /// Queues an event. Returns `false` once the consumer has gone away.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(Frame::Event(event)).is_ok()
    }

    pub fn text(&self, chunk: impl Into<String>) -> bool {
        self.send(Event::text(chunk))
    }

    pub fn tool_call(&self, name: impl Into<String>, args: Value) -> bool {
        self.send(Event::tool_call(name, args))
    }

    /// Ends the stream cleanly.
    pub fn finish(self) {
        let _ = self.tx.send(Frame::End);
    }

    /// Ends the stream with a fault.
    pub fn fail(self, message: impl Into<String>) {
        let _ = self.tx.send(Frame::Fault(message.into()));
    }
}

/// Creates a connected sender and lazy event stream.
pub fn event_channel() -> (EventSender, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let events = stream::unfold(Some(rx), |rx| async move {
        let mut rx = rx?;
        match rx.recv().await {
            Some(Frame::Event(event)) => Some((Ok(event), Some(rx))),
            Some(Frame::End) => None,
            Some(Frame::Fault(message)) => Some((Err(StreamError::Source(message)), None)),
            None => Some((Err(StreamError::Interrupted), None)),
        }
    })
    .boxed();
    (EventSender { tx }, events)
}
