//! Shared fixtures and helper functions for config tests.

use crate::config::{AccTestConfig, ClientSettings};
use ortho_config::MergeComposer;
use rstest::fixture;
use std::sync::Arc;

/// Fixture providing an `AccTestConfig` parsed from a full TOML example.
#[fixture]
pub fn config_from_full_toml() -> AccTestConfig {
    let toml = r#"
        gate_env = "CLOUD_ACC"
        fail_on_accumulated = false

        [client]
        endpoint = "https://api.example.com"
        account = "tester"
        key_id = "aa:bb:cc"
        key_path = "/home/tester/.ssh/id_rsa"
        timeout_secs = 30

        [logging]
        level = "debug"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AccTestConfig` parsed from a minimal TOML example.
#[fixture]
pub fn config_from_partial_toml() -> AccTestConfig {
    let toml = r#"
        [client]
        endpoint = "https://api.example.com"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing fully configured `ClientSettings`.
#[fixture]
pub fn client_settings_complete() -> ClientSettings {
    ClientSettings {
        endpoint: Some(String::from("https://api.example.com")),
        account: Some(String::from("tester")),
        key_id: Some(String::from("aa:bb:cc")),
        ..ClientSettings::default()
    }
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AccTestConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AccTestConfig`.
pub fn merge_config(
    composer: MergeComposer,
) -> Result<AccTestConfig, Arc<ortho_config::OrthoError>> {
    AccTestConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AccTestConfig) {
    assert_eq!(config.gate_env, "ACCTEST", "gate_env should be ACCTEST");
    assert!(
        config.fail_on_accumulated,
        "fail_on_accumulated should be true"
    );
    assert!(
        config.client.endpoint.is_none(),
        "client.endpoint should be None"
    );
    assert!(
        config.client.account.is_none(),
        "client.account should be None"
    );
    assert_eq!(
        config.client.timeout_secs, 60,
        "client.timeout_secs should be 60"
    );
    assert_eq!(config.logging.level, "info", "logging.level should be info");
}

/// Helper: Creates a `MergeComposer` with defaults, file, and env layers for
/// testing layer precedence.
pub fn create_composer_with_file_and_env() -> Result<MergeComposer, serde_json::Error> {
    use ortho_config::serde_json::json;

    let mut composer = create_composer_with_defaults()?;

    composer.push_file(
        json!({
            "client": {
                "endpoint": "https://file.example.com",
                "account": "file-account"
            }
        }),
        None,
    );

    composer.push_environment(json!({
        "client": {"endpoint": "https://env.example.com"}
    }));

    Ok(composer)
}
