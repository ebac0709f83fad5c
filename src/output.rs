//! Output rendering abstraction for parley.
//!
//! Defines the [`Renderer`] trait the engine notifies as a turn progresses.
//! [`StdoutRenderer`] prints to the terminal; [`ChannelRenderer`] forwards
//! [`RenderEvent`]s over a channel for a front end that draws on its own
//! schedule. Rendering is a side channel: the engine's history is the source
//! of truth and every hook has a no-op default.

use colored::Colorize;
use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::message::Message;
use crate::tracker::{ToolCall, ToolStatus};

/// Maximum characters of a tool result shown inline.
const RESULT_PREVIEW_CHARS: usize = 150;

/// Hooks called by the engine as a turn progresses.
pub trait Renderer: Send + Sync {
    /// A responder message was opened for a new round.
    fn message_opened(&self, _message: &Message) {}

    /// A text chunk arrived from the response stream.
    fn render_token(&self, _token: &str) {}

    /// A tool call was registered and is about to run.
    fn tool_start(&self, _call: &ToolCall) {}

    /// A tool call reached a terminal state.
    fn tool_resolved(&self, _call: &ToolCall) {}

    /// The response stream faulted and the turn was aborted. `message` is
    /// the generic fallback text; fault details only go to the log.
    fn render_error(&self, _message: &str) {}

    /// The turn is over.
    fn render_done(&self) {}
}

/// Renderer that ignores every event.
pub struct NullRenderer;

impl Renderer for NullRenderer {}

/// Shortens `text` to [`RESULT_PREVIEW_CHARS`] characters.
pub fn preview(text: &str) -> String {
    if text.chars().count() > RESULT_PREVIEW_CHARS {
        let truncated: String = text.chars().take(RESULT_PREVIEW_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

/// Renders a turn directly to stdout as it happens.
pub struct StdoutRenderer;

impl StdoutRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for StdoutRenderer {
    fn message_opened(&self, _message: &Message) {
        println!();
        print!("{} ", "assistant:".cyan().bold());
        io::stdout().flush().ok();
    }

    fn render_token(&self, token: &str) {
        print!("{}", token);
        // Flush immediately so each chunk appears as it arrives
        io::stdout().flush().ok();
    }

    fn tool_start(&self, call: &ToolCall) {
        println!();
        println!(
            "  {} {} {}",
            "⚙".yellow(),
            call.name.bold(),
            call.args.to_string().dimmed()
        );
    }

    fn tool_resolved(&self, call: &ToolCall) {
        let result = call
            .result
            .as_ref()
            .map(|r| preview(&r.to_string()))
            .unwrap_or_default();
        match call.status {
            ToolStatus::Success => println!("  {} {} {}", "✓".green(), "=>".dimmed(), result.dimmed()),
            ToolStatus::Error => println!("  {} {} {}", "✗".red(), "=>".dimmed(), result.red()),
            ToolStatus::Pending => {}
        }
    }

    fn render_error(&self, err: &str) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), err);
    }

    fn render_done(&self) {
        println!();
        println!();
    }
}

/// Events forwarded by [`ChannelRenderer`].
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    MessageOpened { message_id: String },
    Token(String),
    ToolStart(ToolCall),
    ToolResolved(ToolCall),
    Error(String),
    Done,
}

/// Renderer that sends events over an unbounded channel.
///
/// Fire-and-forget: events are dropped once the receiver is gone.
#[allow(dead_code)]
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<RenderEvent>,
}

#[allow(dead_code)]
impl ChannelRenderer {
    pub fn new(tx: mpsc::UnboundedSender<RenderEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: RenderEvent) {
        let _ = self.tx.send(event);
    }
}

impl Renderer for ChannelRenderer {
    fn message_opened(&self, message: &Message) {
        self.send(RenderEvent::MessageOpened {
            message_id: message.id.clone(),
        });
    }

    fn render_token(&self, token: &str) {
        self.send(RenderEvent::Token(token.to_string()));
    }

    fn tool_start(&self, call: &ToolCall) {
        self.send(RenderEvent::ToolStart(call.clone()));
    }

    fn tool_resolved(&self, call: &ToolCall) {
        self.send(RenderEvent::ToolResolved(call.clone()));
    }

    fn render_error(&self, err: &str) {
        self.send(RenderEvent::Error(err.to_string()));
    }

    fn render_done(&self) {
        self.send(RenderEvent::Done);
    }
}
