//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history`, `/stories`, `/story N`, and `/help`.
//! Returns a [`CommandAction`] so the REPL loop can decide how to proceed.

use colored::Colorize;

use crate::constants::STORY_BOOK;
use crate::engine::ConversationEngine;
use crate::format;

/// Action returned by slash command handling.
#[derive(Debug, PartialEq)]
pub(crate) enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Submit this prompt as if it had been typed.
    Submit(&'static str),
    /// Unknown command was entered.
    Unknown(String),
}

/// Dispatch and handle a slash command.
pub(crate) fn handle_slash_command(command: &str, engine: &ConversationEngine) -> CommandAction {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("/history"), None) => {
            println!("{}", format::format_history(&engine.snapshot()));
            CommandAction::Continue
        }
        (Some("/stories"), None) => {
            println!("{}", "Story book:".bold());
            for (i, story) in STORY_BOOK.iter().enumerate() {
                println!("  {} {}", i.to_string().cyan(), story);
            }
            CommandAction::Continue
        }
        (Some("/story"), Some(index)) => match story(index) {
            Some(prompt) => CommandAction::Submit(prompt),
            None => {
                println!(
                    "{} No story {}. Pick 0-{}.",
                    "?".yellow(),
                    index,
                    STORY_BOOK.len() - 1
                );
                CommandAction::Continue
            }
        },
        (Some("/help"), None) => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - list the story-book prompts", "/stories".cyan());
            println!("  {} - submit story-book prompt N", "/story N".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            CommandAction::Continue
        }
        _ => CommandAction::Unknown(command.to_string()),
    }
}

fn story(index: &str) -> Option<&'static str> {
    index.parse::<usize>().ok().and_then(|i| STORY_BOOK.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullRenderer;
    use crate::source::{scripted::Pacing, StoryBookSource};
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn engine() -> ConversationEngine {
        ConversationEngine::new(
            Arc::new(StoryBookSource::new(Pacing::default())),
            Arc::new(ToolRegistry::new()),
        )
        .with_renderer(Arc::new(NullRenderer))
    }

    #[test]
    fn test_story_command_submits_prompt() {
        let engine = engine();
        assert_eq!(
            handle_slash_command("/story 4", &engine),
            CommandAction::Submit(STORY_BOOK[4])
        );
        assert_eq!(
            handle_slash_command("/story 12", &engine),
            CommandAction::Continue
        );
    }

    #[test]
    fn test_unknown_command() {
        let engine = engine();
        assert_eq!(
            handle_slash_command("/clear", &engine),
            CommandAction::Unknown("/clear".into())
        );
        assert_eq!(
            handle_slash_command("/history extra", &engine),
            CommandAction::Unknown("/history extra".into())
        );
    }
}
