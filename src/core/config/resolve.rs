use std::time::Duration;

use crate::api::client::{Credentials, DustClient, DEFAULT_STREAM_TIMEOUT, DEFAULT_TIMEOUT};
use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use crate::utils::url::{Environment, DEV_ENV_VAR};

pub const API_KEY_ENV_VAR: &str = "DUST_API_KEY";
pub const WORKSPACE_ENV_VAR: &str = "DUST_WORKSPACE_ID";

/// Values given on the command line; they beat everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    pub dev: bool,
}

/// Effective settings after layering flags, environment, and the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    pub default_assistant: Option<String>,
    pub environment: Environment,
    pub request_timeout: Duration,
    pub stream_timeout: Duration,
}

impl Settings {
    pub fn resolve(config: &Config, overrides: &Overrides) -> Self {
        Self::resolve_with(config, overrides, |name| std::env::var(name).ok())
    }

    /// Same as [`Settings::resolve`] with an injectable environment lookup.
    pub fn resolve_with<F>(config: &Config, overrides: &Overrides, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| env_value(API_KEY_ENV_VAR))
            .or_else(|| config.api_key.clone());
        let workspace_id = overrides
            .workspace_id
            .clone()
            .or_else(|| env_value(WORKSPACE_ENV_VAR))
            .or_else(|| config.workspace_id.clone());

        // Presence of the variable selects development, whatever its value.
        let dev = overrides.dev
            || env_value(DEV_ENV_VAR)
                .map(|_| true)
                .or(config.dev)
                .unwrap_or(false);

        Self {
            api_key,
            workspace_id,
            default_assistant: config.default_assistant.clone(),
            environment: Environment::from_dev_flag(dev),
            request_timeout: config
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            stream_timeout: config
                .stream_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_STREAM_TIMEOUT),
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let api_key = self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        let workspace_id = self
            .workspace_id
            .as_deref()
            .ok_or(ConfigError::MissingWorkspaceId)?;
        Ok(Credentials::new(api_key, workspace_id))
    }

    pub fn client(&self) -> crate::api::Result<DustClient> {
        DustClient::builder()
            .environment(self.environment)
            .timeout(self.request_timeout)
            .stream_timeout(self.stream_timeout)
            .build()
    }
}
