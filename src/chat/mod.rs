//! Interactive chat REPL for parley.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). Each line is submitted to the
//! [`ConversationEngine`], which streams its reply through a
//! [`StdoutRenderer`] and keeps the full history for the next turn.

mod commands;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

use crate::cli::build_engine;
use crate::config::Config;
use crate::engine::{SubmitError, TurnOutcome};
use crate::output::StdoutRenderer;

/// Runs the interactive chat REPL.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/parley/chat_history.txt`
pub async fn run_chat(config: Config) -> Result<()> {
    let engine = build_engine(&config, Arc::new(StdoutRenderer::new()));

    println!(
        "{} (/help for commands, Ctrl+D to exit)",
        "parley chat".bold().cyan(),
    );
    println!();

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let prompt = if line.starts_with('/') {
                    match commands::handle_slash_command(&line, &engine) {
                        commands::CommandAction::Continue => continue,
                        commands::CommandAction::Unknown(cmd) => {
                            println!("{} Unknown command: {}", "?".yellow(), cmd);
                            continue;
                        }
                        commands::CommandAction::Submit(prompt) => {
                            println!("{} {}", ">".green().bold(), prompt);
                            prompt.to_string()
                        }
                    }
                } else {
                    line
                };

                match engine.submit(&prompt).await {
                    TurnOutcome::Dropped(SubmitError::Busy) => {
                        println!("{}", "Still working on the last message.".dimmed());
                    }
                    outcome => tracing::debug!(?outcome, "turn finished"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}
