//! File loading and merging for parley configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{Config, DemoConfig, DirectoryConfig};
use crate::constants::{
    DEMO_CHAR_MS, DEMO_REVIEW_MS, DEMO_ROUND_PAUSE_MS, DEMO_START_MS, DEMO_THINK_MS, DEMO_TOOL_MS,
    DEMO_TYPING_MAX_MS, DEMO_TYPING_MIN_MS, SEED_EMAIL_DOMAIN, SEED_GROUPS_MAX, SEED_GROUPS_MIN,
    SEED_USERS_MAX, SEED_USERS_MIN,
};

/// Contents written to a fresh global config file.
pub(super) fn default_toml() -> String {
    format!(
        r#"[demo]
think_ms = {DEMO_THINK_MS}
char_ms = {DEMO_CHAR_MS}
tool_ms = {DEMO_TOOL_MS}
round_pause_ms = {DEMO_ROUND_PAUSE_MS}
typing_min_ms = {DEMO_TYPING_MIN_MS}
typing_max_ms = {DEMO_TYPING_MAX_MS}
review_ms = {DEMO_REVIEW_MS}
start_ms = {DEMO_START_MS}

[directory]
users_min = {SEED_USERS_MIN}
users_max = {SEED_USERS_MAX}
groups_min = {SEED_GROUPS_MIN}
groups_max = {SEED_GROUPS_MAX}
email_domain = "{SEED_EMAIL_DOMAIN}"
"#
    )
}

impl Config {
    /// Loads the global config from `~/.config/parley/config.toml`.
    ///
    /// If no config file exists, creates one with the defaults spelled out
    /// and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = default_toml();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "wrote default config");
            let config: Config = toml::from_str(&default_toml)
                .with_context(|| "Failed to parse default config".to_string())?;
            return Ok(config);
        }
        Self::load_file(&path)
    }

    pub(super) fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        Ok(config)
    }

    /// Look for parley.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::load_file(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        let (g, p) = (global.demo, project.demo);
        let demo = DemoConfig {
            think_ms: p.think_ms.or(g.think_ms),
            char_ms: p.char_ms.or(g.char_ms),
            tool_ms: p.tool_ms.or(g.tool_ms),
            round_pause_ms: p.round_pause_ms.or(g.round_pause_ms),
            typing_min_ms: p.typing_min_ms.or(g.typing_min_ms),
            typing_max_ms: p.typing_max_ms.or(g.typing_max_ms),
            review_ms: p.review_ms.or(g.review_ms),
            start_ms: p.start_ms.or(g.start_ms),
            start_at: p.start_at.or(g.start_at),
        };
        let (g, p) = (global.directory, project.directory);
        let directory = DirectoryConfig {
            users_min: p.users_min.or(g.users_min),
            users_max: p.users_max.or(g.users_max),
            groups_min: p.groups_min.or(g.groups_min),
            groups_max: p.groups_max.or(g.groups_max),
            email_domain: p.email_domain.or(g.email_domain),
        };
        Config { demo, directory }
    }
}
