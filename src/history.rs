//! Append-only conversation history.
//!
//! [`History`] is the only state the response source reads every round. It
//! never reorders or trims messages; the one exception to immutability is the
//! responder message still being streamed, which must be the last message and
//! is addressed by id.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Message, Role, Segment, ToolOutput};

/// Rejected history mutations.
#[derive(Debug, Error, PartialEq)]
pub enum HistoryError {
    #[error("message {0} is not the open responder message")]
    NotActive(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Streams a text chunk into the open responder message.
    ///
    /// Extends the trailing text segment, or starts one if the message has no
    /// segments yet.
    pub fn stream_text(&mut self, id: &str, chunk: &str) -> Result<(), HistoryError> {
        let message = self.active_mut(id)?;
        match message.segments.last_mut() {
            Some(Segment::Text { text }) => text.push_str(chunk),
            _ => message.segments.push(Segment::Text {
                text: chunk.to_string(),
            }),
        }
        Ok(())
    }

    /// Appends closing segments (the round's tool requests, or a fallback
    /// error text) to the open responder message.
    pub fn extend_active(
        &mut self,
        id: &str,
        segments: impl IntoIterator<Item = Segment>,
    ) -> Result<(), HistoryError> {
        self.active_mut(id)?.segments.extend(segments);
        Ok(())
    }

    fn active_mut(&mut self, id: &str) -> Result<&mut Message, HistoryError> {
        match self.messages.last_mut() {
            Some(m) if m.id == id && m.role == Role::Responder => Ok(m),
            _ => Err(HistoryError::NotActive(id.to_string())),
        }
    }

    /// Most recent recorded output of the named tool.
    pub fn latest_result(&self, tool: &str) -> Option<&ToolOutput> {
        self.messages
            .iter()
            .rev()
            .flat_map(|m| m.tool_results().collect::<Vec<_>>().into_iter().rev())
            .find(|(_, name, _)| *name == tool)
            .map(|(_, _, output)| output)
    }

    /// Call ids that were requested but have no recorded result yet.
    #[cfg(test)]
    pub fn unanswered_calls(&self) -> Vec<String> {
        let answered: Vec<&str> = self
            .messages
            .iter()
            .flat_map(|m| m.tool_results())
            .map(|(id, _, _)| id)
            .collect();
        self.messages
            .iter()
            .flat_map(|m| m.tool_requests())
            .filter(|(id, _, _)| !answered.contains(id))
            .map(|(id, _, _)| id.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(call_id: &str, name: &str, value: serde_json::Value) -> Segment {
        Segment::ToolCallResult {
            call_id: call_id.into(),
            name: name.into(),
            output: ToolOutput::Success(value),
        }
    }

    #[test]
    fn test_stream_text_builds_one_segment() {
        let mut history = History::new();
        let msg = Message::responder();
        let id = msg.id.clone();
        history.push(msg);

        history.stream_text(&id, "po").unwrap();
        history.stream_text(&id, "ng").unwrap();

        let last = history.last().unwrap();
        assert_eq!(last.segments.len(), 1);
        assert_eq!(last.text(), "pong");
    }

    #[test]
    fn test_closed_message_rejects_text() {
        let mut history = History::new();
        let first = Message::responder();
        let first_id = first.id.clone();
        history.push(first);
        history.push(Message::submitter("next"));

        let err = history.stream_text(&first_id, "late").unwrap_err();
        assert_eq!(err, HistoryError::NotActive(first_id));
        assert_eq!(history.messages()[0].segments.len(), 0);
    }

    #[test]
    fn test_submitter_message_is_never_active() {
        let mut history = History::new();
        let msg = Message::submitter("hi");
        let id = msg.id.clone();
        history.push(msg);
        assert!(history.extend_active(&id, Vec::new()).is_err());
    }

    #[test]
    fn test_latest_result_prefers_newest() {
        let mut history = History::new();
        history.push(Message::feedback(vec![result("a", "getGroups", json!([1]))]));
        history.push(Message::feedback(vec![
            result("b", "getGroups", json!([2])),
            result("c", "createGroup", json!({"id": "g"})),
        ]));

        assert_eq!(
            history.latest_result("getGroups"),
            Some(&ToolOutput::Success(json!([2])))
        );
        assert!(history.latest_result("deleteGroup").is_none());
    }

    #[test]
    fn test_unanswered_calls() {
        let mut history = History::new();
        let mut msg = Message::responder();
        msg.segments.push(Segment::ToolCallRequest {
            call_id: "a".into(),
            name: "getUsers".into(),
            args: json!({}),
        });
        msg.segments.push(Segment::ToolCallRequest {
            call_id: "b".into(),
            name: "getGroups".into(),
            args: json!({}),
        });
        history.push(msg);
        history.push(Message::feedback(vec![result("a", "getUsers", json!([]))]));

        assert_eq!(history.unanswered_calls(), vec!["b".to_string()]);
    }
}
