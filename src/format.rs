//! Terminal formatting of a conversation for `/history`.
//!
//! Messages that only feed tool results back are not printed on their own;
//! each result is shown under the call that produced it, with the call's
//! status glyph.

use colored::Colorize;

use crate::engine::{ConversationView, MessageView};
use crate::message::{Role, Segment};
use crate::output::preview;
use crate::tracker::{ToolCall, ToolStatus};

/// Format the whole conversation, oldest message first.
pub fn format_history(view: &ConversationView) -> String {
    let blocks: Vec<String> = view
        .messages
        .iter()
        .filter(|m| !m.message.is_tool_feedback())
        .map(format_message)
        .collect();
    if blocks.is_empty() {
        return format!("{}", "No messages yet.".dimmed());
    }
    blocks.join("\n\n")
}

/// Format a message for terminal display with role label and colors.
pub fn format_message(view: &MessageView) -> String {
    let msg = &view.message;
    let mut out = format_role_label(&msg.role);
    for segment in &msg.segments {
        match segment {
            Segment::Text { text } => {
                out.push('\n');
                out.push_str(text.trim_end());
            }
            Segment::ToolCallRequest { call_id, name, .. } => {
                out.push('\n');
                match view.tool_calls.iter().find(|c| &c.id == call_id) {
                    Some(call) => out.push_str(&format_call(call)),
                    None => out.push_str(&format!("  {} {}", "?".dimmed(), name)),
                }
            }
            Segment::ToolCallResult { .. } => {}
        }
    }
    if msg.role == Role::Responder && msg.segments.is_empty() {
        out.push('\n');
        out.push_str(&"(no response)".dimmed().to_string());
    }
    out
}

fn format_role_label(role: &Role) -> String {
    match role {
        Role::Submitter => format!("{}", "you:".green().bold()),
        Role::Responder => format!("{}", "assistant:".cyan().bold()),
    }
}

/// One line for the call, plus one for its result once it has one.
pub fn format_call(call: &ToolCall) -> String {
    let glyph = match call.status {
        ToolStatus::Pending => "⚙".yellow(),
        ToolStatus::Success => "✓".green(),
        ToolStatus::Error => "✗".red(),
    };
    let head = format!(
        "  {} {} {}",
        glyph,
        call.name.bold(),
        call.args.to_string().dimmed()
    );
    match &call.result {
        Some(result) => format!(
            "{}\n    {} {}",
            head,
            "=>".dimmed(),
            preview(&result.to_string()).dimmed()
        ),
        None => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, ToolOutput};
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    fn call(status: ToolStatus, result: Option<serde_json::Value>) -> ToolCall {
        ToolCall {
            id: "c1".into(),
            name: "getUsers".into(),
            args: json!({}),
            status,
            result,
            message_id: "m1".into(),
        }
    }

    #[test]
    fn test_format_call_glyphs() {
        plain();
        assert_eq!(format_call(&call(ToolStatus::Pending, None)), "  ⚙ getUsers {}");
        assert_eq!(
            format_call(&call(ToolStatus::Success, Some(json!([])))),
            "  ✓ getUsers {}\n    => []"
        );
        assert!(format_call(&call(
            ToolStatus::Error,
            Some(json!({"error": "boom"}))
        ))
        .starts_with("  ✗ getUsers"));
    }

    #[test]
    fn test_long_results_are_truncated() {
        plain();
        let long = json!("x".repeat(400));
        let line = format_call(&call(ToolStatus::Success, Some(long)));
        assert!(line.ends_with("..."));
        assert!(line.len() < 250);
    }

    #[test]
    fn test_history_hides_feedback_messages() {
        plain();
        let mut responder = Message::responder();
        responder.segments = vec![
            Segment::Text {
                text: "Fetching.\n".into(),
            },
            Segment::ToolCallRequest {
                call_id: "c1".into(),
                name: "getUsers".into(),
                args: json!({}),
            },
        ];
        let feedback = Message::feedback(vec![Segment::ToolCallResult {
            call_id: "c1".into(),
            name: "getUsers".into(),
            output: ToolOutput::Success(json!([])),
        }]);
        let view = ConversationView {
            busy: false,
            messages: vec![
                MessageView {
                    message: Message::submitter("list users"),
                    tool_calls: vec![],
                },
                MessageView {
                    message: responder,
                    tool_calls: vec![call(ToolStatus::Success, Some(json!([])))],
                },
                MessageView {
                    message: feedback,
                    tool_calls: vec![],
                },
            ],
        };

        assert_eq!(
            format_history(&view),
            "you:\nlist users\n\nassistant:\nFetching.\n  ✓ getUsers {}\n    => []"
        );
    }

    #[test]
    fn test_empty_history() {
        plain();
        let view = ConversationView {
            busy: false,
            messages: vec![],
        };
        assert_eq!(format_history(&view), "No messages yet.");
    }
}
