//! Entry point for parley, a conversation engine with a tool-call loop.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! sets up logging, and dispatches to the appropriate subcommand handler.

mod chat;
mod cli;
mod config;
mod constants;
mod demo;
mod engine;
mod format;
mod history;
mod message;
mod output;
mod source;
mod tools;
mod tracker;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Runs the parley CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, and dispatches the chosen
/// subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    init_logging(cli.verbose);
    cli::run(cli).await
}

/// Logs go to stderr so they never interleave with streamed replies on stdout.
/// `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "parley=debug" } else { "parley=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
