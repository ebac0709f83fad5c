//! Environment variable substitution and default resolution.

use std::ops::RangeInclusive;
use std::time::Duration;

use super::types::Config;
use crate::constants::{
    DEMO_CHAR_MS, DEMO_REVIEW_MS, DEMO_ROUND_PAUSE_MS, DEMO_START_MS, DEMO_THINK_MS, DEMO_TOOL_MS,
    DEMO_TYPING_MAX_MS, DEMO_TYPING_MIN_MS, SEED_EMAIL_DOMAIN, SEED_GROUPS_MAX, SEED_GROUPS_MIN,
    SEED_USERS_MAX, SEED_USERS_MIN,
};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        if let Some(ref mut domain) = self.directory.email_domain {
            *domain = Self::resolve_str(domain);
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    pub(super) fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 5..start + end];
                let value = std::env::var(var_name).unwrap_or_default();
                result = format!(
                    "{}{}{}",
                    &result[..start],
                    value,
                    &result[start + end + 1..]
                );
            } else {
                break;
            }
        }
        result
    }

    pub fn think_delay(&self) -> Duration {
        ms(self.demo.think_ms, DEMO_THINK_MS)
    }

    pub fn char_delay(&self) -> Duration {
        ms(self.demo.char_ms, DEMO_CHAR_MS)
    }

    pub fn tool_latency(&self) -> Duration {
        ms(self.demo.tool_ms, DEMO_TOOL_MS)
    }

    pub fn round_pause(&self) -> Duration {
        ms(self.demo.round_pause_ms, DEMO_ROUND_PAUSE_MS)
    }

    pub fn review_delay(&self) -> Duration {
        ms(self.demo.review_ms, DEMO_REVIEW_MS)
    }

    pub fn start_delay(&self) -> Duration {
        ms(self.demo.start_ms, DEMO_START_MS)
    }

    /// Per-character typing delay range for autoplay, in milliseconds.
    pub fn typing_range(&self) -> RangeInclusive<u64> {
        ordered(
            self.demo.typing_min_ms.unwrap_or(DEMO_TYPING_MIN_MS),
            self.demo.typing_max_ms.unwrap_or(DEMO_TYPING_MAX_MS),
        )
    }

    /// Story index autoplay starts from.
    pub fn start_at(&self) -> usize {
        self.demo.start_at.unwrap_or(0)
    }

    /// How many users to seed. A reversed range is swapped.
    pub fn seed_users(&self) -> RangeInclusive<usize> {
        ordered(
            self.directory.users_min.unwrap_or(SEED_USERS_MIN),
            self.directory.users_max.unwrap_or(SEED_USERS_MAX),
        )
    }

    /// How many groups to seed. A reversed range is swapped.
    pub fn seed_groups(&self) -> RangeInclusive<usize> {
        ordered(
            self.directory.groups_min.unwrap_or(SEED_GROUPS_MIN),
            self.directory.groups_max.unwrap_or(SEED_GROUPS_MAX),
        )
    }

    pub fn email_domain(&self) -> &str {
        match self.directory.email_domain.as_deref() {
            Some(domain) if !domain.is_empty() => domain,
            _ => SEED_EMAIL_DOMAIN,
        }
    }
}

fn ms(value: Option<u64>, default: u64) -> Duration {
    Duration::from_millis(value.unwrap_or(default))
}

fn ordered<T: Ord>(a: T, b: T) -> RangeInclusive<T> {
    if a <= b {
        a..=b
    } else {
        b..=a
    }
}
