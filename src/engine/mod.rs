//! The conversation engine.
//!
//! [`ConversationEngine`] owns the [`History`] and the [`ToolCallTracker`] and
//! drives a turn as a sequence of rounds:
//!
//! 1. open an empty responder message,
//! 2. ask the [`ResponseSource`] for a stream over the closed history,
//! 3. stream text into the open message while buffering tool requests,
//! 4. append the buffered requests after the text,
//! 5. stop if there were none, otherwise run each one in request order,
//! 6. feed every result back in a single submitter message and go again.
//!
//! Tool failures become error results and the turn carries on. A fault of
//! the stream itself ends the turn with a fallback text segment.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::constants::STREAM_FAILURE_TEXT;
use crate::history::{History, HistoryError};
use crate::message::{Message, Segment, ToolOutput};
use crate::output::{NullRenderer, Renderer};
use crate::source::{Event, ResponseSource, StreamError};
use crate::tools::ToolRegistry;
use crate::tracker::{ToolCall, ToolCallTracker, ToolStatus};

/// Why a submission was dropped without starting a turn.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("submission is empty")]
    Empty,
    #[error("a turn is already in flight")]
    Busy,
}

/// How a call to [`ConversationEngine::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The last round produced no tool requests.
    Completed { rounds: usize },
    /// The response stream faulted during the last round.
    Faulted { rounds: usize },
    /// Nothing happened; history is unchanged.
    Dropped(SubmitError),
}

/// Tunables for the engine loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Pause after a tool round before the next responder message opens.
    pub round_pause: Duration,
}

/// A message together with the tool calls attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub tool_calls: Vec<ToolCall>,
}

/// Read-only picture of the conversation for a presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub busy: bool,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Error)]
enum TurnFault {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

enum RoundEnd {
    /// The round asked for tools; their results are in history.
    Continue,
    /// The round asked for nothing; the turn is over.
    Finished,
}

struct PendingCall {
    id: String,
    name: String,
    args: Value,
}

#[derive(Default)]
struct State {
    history: History,
    tracker: ToolCallTracker,
}

/// Holds the busy flag for the lifetime of a turn.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ConversationEngine {
    source: Arc<dyn ResponseSource>,
    tools: Arc<ToolRegistry>,
    renderer: Arc<dyn Renderer>,
    options: EngineOptions,
    busy: AtomicBool,
    state: Mutex<State>,
}

impl ConversationEngine {
    pub fn new(source: Arc<dyn ResponseSource>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            source,
            tools,
            renderer: Arc::new(NullRenderer),
            options: EngineOptions::default(),
            busy: AtomicBool::new(false),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// True while a turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the history.
    pub fn history(&self) -> History {
        self.state().history.clone()
    }

    /// Tool calls attached to a responder message, in dispatch order.
    pub fn tool_calls(&self, message_id: &str) -> Vec<ToolCall> {
        self.state().tracker.for_message(message_id)
    }

    pub fn snapshot(&self) -> ConversationView {
        let state = self.state();
        ConversationView {
            busy: self.is_busy(),
            messages: state
                .history
                .messages()
                .iter()
                .map(|m| MessageView {
                    message: m.clone(),
                    tool_calls: state.tracker.for_message(&m.id),
                })
                .collect(),
        }
    }

    /// Appends `text` as a submitter message and runs a turn to completion.
    ///
    /// Blank input and input arriving while a turn is in flight are dropped
    /// without touching history.
    pub async fn submit(&self, text: &str) -> TurnOutcome {
        if text.trim().is_empty() {
            tracing::debug!("dropping empty submission");
            return TurnOutcome::Dropped(SubmitError::Empty);
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!("dropping submission while busy");
            return TurnOutcome::Dropped(SubmitError::Busy);
        };

        self.state().history.push(Message::submitter(text));
        let turn = Uuid::new_v4();
        self.run_turn()
            .instrument(tracing::info_span!("turn", %turn))
            .await
    }

    async fn run_turn(&self) -> TurnOutcome {
        let mut rounds = 0;
        loop {
            rounds += 1;
            let end = self
                .run_round()
                .instrument(tracing::debug_span!("round", round = rounds))
                .await;
            match end {
                Ok(RoundEnd::Finished) => {
                    tracing::info!(rounds, "turn complete");
                    self.renderer.render_done();
                    return TurnOutcome::Completed { rounds };
                }
                Ok(RoundEnd::Continue) => {
                    if !self.options.round_pause.is_zero() {
                        tokio::time::sleep(self.options.round_pause).await;
                    }
                }
                Err(fault) => {
                    tracing::warn!(rounds, error = %fault, "turn aborted");
                    self.renderer.render_error(STREAM_FAILURE_TEXT);
                    self.renderer.render_done();
                    return TurnOutcome::Faulted { rounds };
                }
            }
        }
    }

    async fn run_round(&self) -> Result<RoundEnd, TurnFault> {
        let active = Message::responder();
        let active_id = active.id.clone();
        let snapshot = {
            let mut state = self.state();
            let snapshot = state.history.clone();
            state.history.push(active.clone());
            snapshot
        };
        self.renderer.message_opened(&active);

        let requests = match self.collect(&active_id, snapshot).await {
            Ok(requests) => requests,
            Err(fault) => {
                self.state().history.extend_active(
                    &active_id,
                    [Segment::Text {
                        text: STREAM_FAILURE_TEXT.to_string(),
                    }],
                )?;
                return Err(fault);
            }
        };

        self.state().history.extend_active(
            &active_id,
            requests.iter().map(|r| Segment::ToolCallRequest {
                call_id: r.id.clone(),
                name: r.name.clone(),
                args: r.args.clone(),
            }),
        )?;

        if requests.is_empty() {
            return Ok(RoundEnd::Finished);
        }
        tracing::debug!(calls = requests.len(), "dispatching tool calls");

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.dispatch(&active_id, request).await);
        }
        self.state().history.push(Message::feedback(results));
        Ok(RoundEnd::Continue)
    }

    /// Drains the round's stream: text goes straight into the open message,
    /// requests are returned in arrival order once the stream has ended.
    async fn collect(
        &self,
        active_id: &str,
        snapshot: History,
    ) -> Result<Vec<PendingCall>, TurnFault> {
        let mut events = self.source.stream(snapshot);
        let mut requests: Vec<PendingCall> = Vec::new();
        let mut ids = HashSet::new();

        while let Some(event) = events.next().await {
            match event? {
                Event::Text(chunk) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    self.state().history.stream_text(active_id, &chunk)?;
                    self.renderer.render_token(&chunk);
                }
                Event::ToolCallRequest { id, name, args } => {
                    let id = match id {
                        Some(id) if !ids.contains(&id) && !self.is_tracked(&id) => id,
                        Some(taken) => {
                            let fresh = Uuid::new_v4().to_string();
                            tracing::warn!(%taken, %fresh, "duplicate call id, reassigned");
                            fresh
                        }
                        None => Uuid::new_v4().to_string(),
                    };
                    ids.insert(id.clone());
                    requests.push(PendingCall { id, name, args });
                }
            }
        }
        Ok(requests)
    }

    /// Runs one tool call and returns the result segment to feed back.
    async fn dispatch(&self, active_id: &str, request: PendingCall) -> Segment {
        let PendingCall { id, name, args } = request;
        let registered = self
            .state()
            .tracker
            .register(active_id, &id, &name, args.clone())
            .map(ToolCall::clone);
        match registered {
            Ok(call) => self.renderer.tool_start(&call),
            Err(e) => tracing::warn!(error = %e, "tool call not tracked"),
        }

        let output = match self.tools.invoke(&name, args).await {
            Ok(value) => {
                tracing::debug!(call_id = %id, tool = %name, "tool call succeeded");
                ToolOutput::Success(value)
            }
            Err(e) => {
                tracing::warn!(call_id = %id, tool = %name, error = %e, "tool call failed");
                ToolOutput::Error(e.to_string())
            }
        };

        let status = if output.is_error() {
            ToolStatus::Error
        } else {
            ToolStatus::Success
        };
        let resolved = self
            .state()
            .tracker
            .resolve(&id, status, output.to_value())
            .map(ToolCall::clone);
        match resolved {
            Ok(call) => self.renderer.tool_resolved(&call),
            Err(e) => tracing::warn!(error = %e, "tool call resolution rejected"),
        }

        Segment::ToolCallResult {
            call_id: id,
            name,
            output,
        }
    }

    fn is_tracked(&self, id: &str) -> bool {
        self.state().tracker.get(id).is_some()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
