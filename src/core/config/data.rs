use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::config::io::ConfigError;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Workspace API key (`sk-...`)
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    /// Assistant sId used by `chat` and the create commands when none is given
    pub default_assistant: Option<String>,
    /// Talk to a local development server instead of dust.tt
    pub dev: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub stream_timeout_secs: Option<u64>,
}

/// Keys accepted by `config set` and `config unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiKey,
    WorkspaceId,
    DefaultAssistant,
    Dev,
    RequestTimeout,
    StreamTimeout,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::ApiKey,
        ConfigKey::WorkspaceId,
        ConfigKey::DefaultAssistant,
        ConfigKey::Dev,
        ConfigKey::RequestTimeout,
        ConfigKey::StreamTimeout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "api-key",
            ConfigKey::WorkspaceId => "workspace-id",
            ConfigKey::DefaultAssistant => "default-assistant",
            ConfigKey::Dev => "dev",
            ConfigKey::RequestTimeout => "request-timeout",
            ConfigKey::StreamTimeout => "stream-timeout",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Parse a boolean the way people type it on a command line.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_secs(key: ConfigKey, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            key: key.name(),
            value: value.to_string(),
            expected: "a positive number of seconds",
        }),
    }
}

fn non_empty(key: ConfigKey, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.name(),
            value: value.to_string(),
            expected: "a non-empty value",
        });
    }
    Ok(trimmed.to_string())
}

impl Config {
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        match key {
            ConfigKey::ApiKey => self.api_key = Some(non_empty(key, value)?),
            ConfigKey::WorkspaceId => self.workspace_id = Some(non_empty(key, value)?),
            ConfigKey::DefaultAssistant => self.default_assistant = Some(non_empty(key, value)?),
            ConfigKey::Dev => {
                let dev = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.name(),
                    value: value.to_string(),
                    expected: "on/off, true/false or 1/0",
                })?;
                self.dev = Some(dev);
            }
            ConfigKey::RequestTimeout => self.request_timeout_secs = Some(parse_secs(key, value)?),
            ConfigKey::StreamTimeout => self.stream_timeout_secs = Some(parse_secs(key, value)?),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ApiKey => self.api_key = None,
            ConfigKey::WorkspaceId => self.workspace_id = None,
            ConfigKey::DefaultAssistant => self.default_assistant = None,
            ConfigKey::Dev => self.dev = None,
            ConfigKey::RequestTimeout => self.request_timeout_secs = None,
            ConfigKey::StreamTimeout => self.stream_timeout_secs = None,
        }
    }
}
