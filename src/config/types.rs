//! Struct definitions for parley configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for parley, deserialized from `config.toml`.
///
/// Every field is optional so a partial project file can be merged over the
/// global one. Accessors in `resolve.rs` fill in defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Demo pacing and autoplay settings.
    #[serde(default)]
    pub demo: DemoConfig,
    /// Seeding of the in-memory directory.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Delays used by the scripted source, the tools and autoplay, in milliseconds.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct DemoConfig {
    /// Pause before a scripted reply starts streaming.
    pub think_ms: Option<u64>,
    /// Pause before each streamed character.
    pub char_ms: Option<u64>,
    /// Simulated latency of each tool call.
    pub tool_ms: Option<u64>,
    /// Pause between rounds of a turn.
    pub round_pause_ms: Option<u64>,
    /// Typing delay range used when autoplay types a prompt.
    pub typing_min_ms: Option<u64>,
    pub typing_max_ms: Option<u64>,
    /// Pause after a turn before autoplay moves on.
    pub review_ms: Option<u64>,
    /// Pause before autoplay types its first prompt.
    pub start_ms: Option<u64>,
    /// Story index autoplay starts from.
    pub start_at: Option<usize>,
}

/// How the directory is seeded at startup.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct DirectoryConfig {
    pub users_min: Option<usize>,
    pub users_max: Option<usize>,
    pub groups_min: Option<usize>,
    pub groups_max: Option<usize>,
    /// Email domain of seeded users.
    pub email_domain: Option<String>,
}
