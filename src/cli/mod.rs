//! Command-line interface definition and dispatch for parley.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler; the demo driver lives in [`crate::demo`].

use crate::config::Config;
use crate::demo::{self, Autoplay};
use crate::engine::{ConversationEngine, EngineOptions};
use crate::output::{Renderer, StdoutRenderer};
use crate::source::{scripted::Pacing, StoryBookSource};
use crate::tools::directory::Directory;
use crate::tools::ToolRegistry;
use crate::{chat, constants};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Top-level CLI structure for parley.
#[derive(Parser)]
#[command(
    name = "parley",
    about = "A conversation engine with a tool-call loop, demonstrated against an in-memory directory"
)]
pub struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the parley CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Play the story book automatically
    Demo {
        /// Story index to start from (0-7)
        #[arg(long)]
        from: Option<usize>,
    },
    /// List the available tools
    Tools,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Builds an engine over a freshly seeded directory.
pub(crate) fn build_engine(config: &Config, renderer: Arc<dyn Renderer>) -> ConversationEngine {
    let directory = Directory::seeded(
        &mut rand::thread_rng(),
        config.seed_users(),
        config.seed_groups(),
        config.email_domain(),
    );
    tracing::debug!(
        users = directory.users.len(),
        groups = directory.groups.len(),
        "seeded directory"
    );
    let tools = ToolRegistry::with_directory(directory.shared()).with_latency(config.tool_latency());
    let source = StoryBookSource::new(Pacing {
        think: config.think_delay(),
        per_char: config.char_delay(),
    });
    ConversationEngine::new(Arc::new(source), Arc::new(tools))
        .with_renderer(renderer)
        .with_options(EngineOptions {
            round_pause: config.round_pause(),
        })
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat => {
            let config = Config::load()?;
            chat::run_chat(config).await
        }
        Commands::Demo { from } => {
            let config = Config::load()?;
            let engine = build_engine(&config, Arc::new(StdoutRenderer::new()));
            let from = from.unwrap_or_else(|| config.start_at());

            // First Ctrl+C stops autoplay gracefully, a second one exits.
            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if demo::interrupt(&flag) {
                        std::process::exit(130);
                    }
                    eprintln!(
                        "{}",
                        "stopping after this turn... (Ctrl+C again to quit)".dimmed()
                    );
                }
            });

            println!(
                "{} playing {} stories (Ctrl+C to stop)",
                constants::APP_NAME.bold().cyan(),
                constants::STORY_BOOK.len().saturating_sub(from),
            );
            println!();
            let played = Autoplay::from_config(&config)
                .run(&engine, from, &stop)
                .await?;
            println!("{}", format!("played {} stories.", played).dimmed());
            Ok(())
        }
        Commands::Tools => {
            let registry = ToolRegistry::with_directory(Directory::new().shared());
            for def in registry.definitions() {
                println!("{} {}", def.name.bold(), def.description);
                println!("  {}", def.parameters.to_string().dimmed());
            }
            Ok(())
        }
        Commands::Config { action } => {
            let config = Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let toml_str = toml::to_string_pretty(&config)?;
                    println!("{}", toml_str);
                }
            }
            Ok(())
        }
    }
}
