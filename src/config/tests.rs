use super::loader::default_toml;
use super::*;
use std::time::Duration;

#[test]
fn test_empty_config_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.think_delay(), Duration::from_millis(2200));
    assert_eq!(config.char_delay(), Duration::from_millis(35));
    assert_eq!(config.tool_latency(), Duration::from_millis(2000));
    assert_eq!(config.round_pause(), Duration::from_millis(500));
    assert_eq!(config.typing_range(), 50..=100);
    assert_eq!(config.seed_users(), 3..=6);
    assert_eq!(config.seed_groups(), 1..=2);
    assert_eq!(config.email_domain(), "company.com");
    assert_eq!(config.start_at(), 0);
}

#[test]
fn test_default_file_matches_defaults() {
    let written: Config = toml::from_str(&default_toml()).unwrap();
    let empty = Config::default();
    assert_eq!(written.think_delay(), empty.think_delay());
    assert_eq!(written.review_delay(), empty.review_delay());
    assert_eq!(written.start_delay(), empty.start_delay());
    assert_eq!(written.seed_users(), empty.seed_users());
    assert_eq!(written.email_domain(), empty.email_domain());
}

#[test]
fn test_project_overrides_global() {
    let global: Config = toml::from_str(
        r#"
[demo]
think_ms = 100
char_ms = 5

[directory]
email_domain = "corp.io"
"#,
    )
    .unwrap();
    let project: Config = toml::from_str(
        r#"
[demo]
char_ms = 0
start_at = 3
"#,
    )
    .unwrap();

    let merged = Config::merge(global, project);
    assert_eq!(merged.think_delay(), Duration::from_millis(100));
    assert_eq!(merged.char_delay(), Duration::ZERO);
    assert_eq!(merged.start_at(), 3);
    assert_eq!(merged.email_domain(), "corp.io");
}

#[test]
fn test_reversed_ranges_are_swapped() {
    let config: Config = toml::from_str(
        r#"
[demo]
typing_min_ms = 90
typing_max_ms = 10

[directory]
users_min = 8
users_max = 2
"#,
    )
    .unwrap();
    assert_eq!(config.typing_range(), 10..=90);
    assert_eq!(config.seed_users(), 2..=8);
}

#[test]
fn test_env_substitution() {
    std::env::set_var("PARLEY_TEST_DOMAIN", "env.example");
    let mut config: Config = toml::from_str(
        r#"
[directory]
email_domain = "{env:PARLEY_TEST_DOMAIN}"
"#,
    )
    .unwrap();
    config.resolve_substitutions();
    assert_eq!(config.email_domain(), "env.example");

    assert_eq!(Config::resolve_str("a{env:PARLEY_TEST_UNSET_VAR}b"), "ab");
    assert_eq!(Config::resolve_str("{env:open"), "{env:open");
}
