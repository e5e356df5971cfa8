//! Configuration module

use std::time::Duration;

use serde::Deserialize;

use crate::host::{HostParameters, PARAM_DEBUG, PARAM_STEAM_ID};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub steam: SteamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub steam_id: String,
    #[serde(default)]
    pub debug: i32,
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            steam_id: String::new(),
            debug: 0,
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub cache_bust: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            cache_bust: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SteamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_heartbeat_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://steamcommunity.com".to_string()
}

fn default_user_agent() -> String {
    format!("steam-presence-bridge/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("STEAMBRIDGE").separator("__"))
            .build()?;

        Ok(Self::from_settings(settings))
    }

    /// Deserialize built settings, falling back to defaults on bad input.
    /// Needs a subscriber installed for the fallback warning to be seen.
    pub fn from_settings(settings: config::Config) -> Self {
        settings.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!("Invalid configuration, using defaults: {}", e);
            Config::default()
        })
    }

    /// Parameters as the host would hand them to the plugin at startup
    pub fn host_parameters(&self) -> HostParameters {
        let mut params = HostParameters::new();
        params.insert(PARAM_STEAM_ID, self.plugin.steam_id.trim());
        params.insert(PARAM_DEBUG, self.plugin.debug.to_string());
        params
    }

    /// Default tracing filter derived from the host debug mask
    pub fn log_filter(&self) -> String {
        let level = match self.plugin.debug {
            0 => "info",
            -1 => "trace",
            _ => "debug",
        };
        format!("steam_presence_bridge={}", level)
    }
}
