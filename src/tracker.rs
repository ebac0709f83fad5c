//! Per-call lifecycle tracking for tool invocations.
//!
//! The engine registers a [`ToolCall`] as `pending` right before it dispatches
//! the call, then resolves it exactly once. Every entry remembers the
//! responder message that was active when it was registered, which is how a
//! presentation layer finds the calls to draw under each message.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Lifecycle state of a tool call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Pending,
    Success,
    Error,
}

impl ToolStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ToolStatus::Pending)
    }
}

/// Display entity for a single tool call, keyed by call id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Responder message this call is attached to.
    pub message_id: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("tool call {0} is already registered")]
    DuplicateCall(String),
    #[error("tool call {0} is not registered")]
    UnknownCall(String),
    #[error("tool call {0} is already resolved")]
    AlreadyResolved(String),
    #[error("tool call {0} cannot be resolved back to pending")]
    NotTerminal(String),
}

/// Engine-owned index from call id to [`ToolCall`].
#[derive(Debug, Default)]
pub struct ToolCallTracker {
    calls: HashMap<String, ToolCall>,
    /// Registration order per message.
    by_message: HashMap<String, Vec<String>>,
}

impl ToolCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending entry attached to `message_id`.
    pub fn register(
        &mut self,
        message_id: &str,
        id: &str,
        name: &str,
        args: Value,
    ) -> Result<&ToolCall, TrackerError> {
        if self.calls.contains_key(id) {
            return Err(TrackerError::DuplicateCall(id.to_string()));
        }
        self.by_message
            .entry(message_id.to_string())
            .or_default()
            .push(id.to_string());
        let call = self.calls.entry(id.to_string()).or_insert(ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            args,
            status: ToolStatus::Pending,
            result: None,
            message_id: message_id.to_string(),
        });
        Ok(call)
    }

    /// Moves a pending entry to a terminal state. Only the first call wins.
    pub fn resolve(
        &mut self,
        id: &str,
        status: ToolStatus,
        result: Value,
    ) -> Result<&ToolCall, TrackerError> {
        if !status.is_terminal() {
            return Err(TrackerError::NotTerminal(id.to_string()));
        }
        let call = self
            .calls
            .get_mut(id)
            .ok_or_else(|| TrackerError::UnknownCall(id.to_string()))?;
        if call.status.is_terminal() {
            return Err(TrackerError::AlreadyResolved(id.to_string()));
        }
        call.status = status;
        call.result = Some(result);
        Ok(call)
    }

    pub fn get(&self, id: &str) -> Option<&ToolCall> {
        self.calls.get(id)
    }

    /// Calls attached to a message, in registration order.
    pub fn for_message(&self, message_id: &str) -> Vec<ToolCall> {
        self.by_message
            .get(message_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.calls.get(id).cloned())
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_starts_pending() {
        let mut tracker = ToolCallTracker::new();
        let call = tracker.register("m1", "c1", "getUsers", json!({})).unwrap();
        assert_eq!(call.status, ToolStatus::Pending);
        assert!(call.result.is_none());
        assert_eq!(call.message_id, "m1");
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let mut tracker = ToolCallTracker::new();
        tracker.register("m1", "c1", "getUsers", json!({})).unwrap();
        let err = tracker
            .register("m2", "c1", "getGroups", json!({}))
            .unwrap_err();
        assert_eq!(err, TrackerError::DuplicateCall("c1".into()));
        assert_eq!(tracker.get("c1").unwrap().name, "getUsers");
        assert!(tracker.for_message("m2").is_empty());
    }

    #[test]
    fn test_second_resolve_is_rejected() {
        let mut tracker = ToolCallTracker::new();
        tracker.register("m1", "c1", "getUsers", json!({})).unwrap();
        tracker
            .resolve("c1", ToolStatus::Success, json!([1, 2, 3]))
            .unwrap();

        let err = tracker
            .resolve("c1", ToolStatus::Error, json!({"error": "late"}))
            .unwrap_err();
        assert_eq!(err, TrackerError::AlreadyResolved("c1".into()));

        let call = tracker.get("c1").unwrap();
        assert_eq!(call.status, ToolStatus::Success);
        assert_eq!(call.result, Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_resolve_to_pending_rejected() {
        let mut tracker = ToolCallTracker::new();
        tracker.register("m1", "c1", "getUsers", json!({})).unwrap();
        let err = tracker
            .resolve("c1", ToolStatus::Pending, json!(null))
            .unwrap_err();
        assert_eq!(err, TrackerError::NotTerminal("c1".into()));
        assert_eq!(tracker.get("c1").unwrap().status, ToolStatus::Pending);
    }

    #[test]
    fn test_resolve_unknown_call() {
        let mut tracker = ToolCallTracker::new();
        let err = tracker
            .resolve("nope", ToolStatus::Success, json!(1))
            .unwrap_err();
        assert_eq!(err, TrackerError::UnknownCall("nope".into()));
    }

    #[test]
    fn test_for_message_keeps_registration_order() {
        let mut tracker = ToolCallTracker::new();
        tracker.register("m1", "b", "second", json!({})).unwrap();
        tracker.register("m1", "a", "first", json!({})).unwrap();
        tracker.register("m2", "c", "other", json!({})).unwrap();

        let names: Vec<_> = tracker
            .for_message("m1")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(tracker.len(), 3);
    }
}
