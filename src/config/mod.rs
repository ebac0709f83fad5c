//! Configuration types and path resolution for parley.
//!
//! Parley stores its settings as TOML at the platform's XDG config path
//! (e.g. `~/.config/parley/config.toml` on Linux). A `parley.toml` in the
//! working directory or any parent up to the git root overrides it.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::Config;
#[allow(unused_imports)]
pub use types::{DemoConfig, DirectoryConfig};

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates default config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;

        let mut config = global;
        if let Some(proj) = project {
            tracing::debug!("merging project config");
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
