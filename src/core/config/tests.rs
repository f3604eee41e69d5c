use super::data::{Config, ConfigKey};
use super::io::ConfigError;
use super::resolve::{Overrides, Settings, API_KEY_ENV_VAR, WORKSPACE_ENV_VAR};
use crate::api::client::{DEFAULT_STREAM_TIMEOUT, DEFAULT_TIMEOUT};
use crate::utils::url::{Environment, DEV_ENV_VAR};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

fn no_env() -> impl Fn(&str) -> Option<String> {
    |_: &str| None
}

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set(ConfigKey::ApiKey, "sk-abc").unwrap();
    config.set(ConfigKey::WorkspaceId, "ws1").unwrap();
    config.set(ConfigKey::StreamTimeout, "600").unwrap();
    config.save_to_path(&config_path).expect("Failed to save config");

    let mut loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.api_key.as_deref(), Some("sk-abc"));
    assert_eq!(loaded.workspace_id.as_deref(), Some("ws1"));
    assert_eq!(loaded.stream_timeout_secs, Some(600));

    loaded.unset(ConfigKey::ApiKey);
    loaded.save_to_path(&config_path).expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.api_key, None);
    assert_eq!(reloaded.workspace_id.as_deref(), Some("ws1"));
}

#[test]
fn test_parse_error_names_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "api_key = [not toml").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn test_config_keys_parse_loosely() {
    assert_eq!("api-key".parse::<ConfigKey>().unwrap(), ConfigKey::ApiKey);
    assert_eq!("WORKSPACE_ID".parse::<ConfigKey>().unwrap(), ConfigKey::WorkspaceId);
    assert_eq!(
        " default-assistant ".parse::<ConfigKey>().unwrap(),
        ConfigKey::DefaultAssistant
    );
    assert!(matches!(
        "theme".parse::<ConfigKey>(),
        Err(ConfigError::UnknownKey(key)) if key == "theme"
    ));
}

#[test]
fn test_set_rejects_bad_values() {
    let mut config = Config::default();
    assert!(config.set(ConfigKey::Dev, "maybe").is_err());
    assert!(config.set(ConfigKey::RequestTimeout, "0").is_err());
    assert!(config.set(ConfigKey::RequestTimeout, "ten").is_err());
    assert!(config.set(ConfigKey::ApiKey, "   ").is_err());

    config.set(ConfigKey::Dev, "on").unwrap();
    assert_eq!(config.dev, Some(true));
    assert_eq!(config, Config { dev: Some(true), ..Default::default() });
}

#[test]
fn test_flags_beat_env_beat_file() {
    let config = Config {
        api_key: Some("file-key".to_string()),
        workspace_id: Some("file-ws".to_string()),
        ..Default::default()
    };
    let env = env_from(&[(API_KEY_ENV_VAR, "env-key"), (WORKSPACE_ENV_VAR, "env-ws")]);

    let from_env = Settings::resolve_with(&config, &Overrides::default(), &env);
    assert_eq!(from_env.api_key.as_deref(), Some("env-key"));
    assert_eq!(from_env.workspace_id.as_deref(), Some("env-ws"));

    let overrides = Overrides {
        api_key: Some("flag-key".to_string()),
        ..Default::default()
    };
    let from_flag = Settings::resolve_with(&config, &overrides, &env);
    assert_eq!(from_flag.api_key.as_deref(), Some("flag-key"));
    assert_eq!(from_flag.workspace_id.as_deref(), Some("env-ws"));

    let from_file = Settings::resolve_with(&config, &Overrides::default(), no_env());
    assert_eq!(from_file.api_key.as_deref(), Some("file-key"));
}

#[test]
fn test_empty_env_values_are_ignored() {
    let config = Config {
        api_key: Some("file-key".to_string()),
        ..Default::default()
    };
    let env = env_from(&[(API_KEY_ENV_VAR, ""), (DEV_ENV_VAR, "")]);
    let settings = Settings::resolve_with(&config, &Overrides::default(), env);
    assert_eq!(settings.api_key.as_deref(), Some("file-key"));
    assert_eq!(settings.environment, Environment::Production);
}

#[test]
fn test_dev_selection() {
    let config = Config::default();

    let default = Settings::resolve_with(&config, &Overrides::default(), no_env());
    assert_eq!(default.environment, Environment::Production);

    let flagged = Settings::resolve_with(
        &config,
        &Overrides {
            dev: true,
            ..Default::default()
        },
        no_env(),
    );
    assert_eq!(flagged.environment, Environment::Development);

    let any_value = Settings::resolve_with(
        &config,
        &Overrides::default(),
        env_from(&[(DEV_ENV_VAR, "True")]),
    );
    assert_eq!(any_value.environment, Environment::Development);

    let opaque_value = Settings::resolve_with(
        &config,
        &Overrides::default(),
        env_from(&[(DEV_ENV_VAR, "please")]),
    );
    assert_eq!(opaque_value.environment, Environment::Development);

    for value in ["0", "false", "no", "off"] {
        let settings = Settings::resolve_with(
            &config,
            &Overrides::default(),
            env_from(&[(DEV_ENV_VAR, value)]),
        );
        assert_eq!(
            settings.environment,
            Environment::Development,
            "DUST_CLI_DEV={value:?} should select development"
        );
    }

    let file_dev = Config {
        dev: Some(true),
        ..Default::default()
    };

    let from_file = Settings::resolve_with(&file_dev, &Overrides::default(), no_env());
    assert_eq!(from_file.environment, Environment::Development);
}

#[test]
fn test_timeouts_default_and_override() {
    let defaults = Settings::resolve_with(&Config::default(), &Overrides::default(), no_env());
    assert_eq!(defaults.request_timeout, DEFAULT_TIMEOUT);
    assert_eq!(defaults.stream_timeout, DEFAULT_STREAM_TIMEOUT);

    let config = Config {
        request_timeout_secs: Some(5),
        stream_timeout_secs: Some(42),
        ..Default::default()
    };
    let settings = Settings::resolve_with(&config, &Overrides::default(), no_env());
    assert_eq!(settings.request_timeout, Duration::from_secs(5));
    assert_eq!(settings.stream_timeout, Duration::from_secs(42));

    let client = settings.client().expect("client should build");
    assert_eq!(client.timeout(), Duration::from_secs(5));
    assert_eq!(client.stream_timeout(), Duration::from_secs(42));
}

#[test]
fn test_missing_credentials_are_reported() {
    let settings = Settings::resolve_with(&Config::default(), &Overrides::default(), no_env());
    assert!(matches!(
        settings.credentials(),
        Err(ConfigError::MissingApiKey)
    ));

    let settings = Settings::resolve_with(
        &Config::default(),
        &Overrides {
            api_key: Some("k".to_string()),
            ..Default::default()
        },
        no_env(),
    );
    assert!(matches!(
        settings.credentials(),
        Err(ConfigError::MissingWorkspaceId)
    ));

    let settings = Settings::resolve_with(
        &Config::default(),
        &Overrides::default(),
        env_from(&[(API_KEY_ENV_VAR, "k"), (WORKSPACE_ENV_VAR, "w")]),
    );
    let credentials = settings.credentials().unwrap();
    assert_eq!(credentials.workspace_id, "w");
}
