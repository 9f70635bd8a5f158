use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{deserialize_duration_from_seconds, serialize_duration_to_seconds, ServerConfig};

/// Provides the default value for sweep_interval.
fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default value for offline_grace.
fn default_offline_grace() -> Duration {
    Duration::from_secs(600)
}

/// Provides the default value for renotify_cooldown.
fn default_renotify_cooldown() -> Duration {
    Duration::from_secs(600)
}

/// Provides the default value for request_timeout.
fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Provides the default value for shutdown_timeout.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Loads the messenger token from the `VIGIL_MESSENGER_TOKEN` environment
/// variable when not set in the config file.
fn default_messenger_token_from_env() -> Option<String> {
    std::env::var("VIGIL_MESSENGER_TOKEN").ok()
}

/// Application configuration for Vigil.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite database.
    pub database_url: String,

    /// Base URL of the presence gateway queried each sweep.
    pub presence_base_url: Url,

    /// Base URL of the messenger gateway notifications are delivered to.
    pub messenger_base_url: Url,

    /// Optional bearer token for the messenger gateway.
    #[serde(default = "default_messenger_token_from_env")]
    pub messenger_token: Option<String>,

    /// The interval in seconds between sweep cycles.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_sweep_interval"
    )]
    pub sweep_interval: Duration,

    /// How long an entity may be offline before the first alert fires.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_offline_grace"
    )]
    pub offline_grace: Duration,

    /// Minimum time between repeat offline alerts for the same outage.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_renotify_cooldown"
    )]
    pub renotify_cooldown: Duration,

    /// Timeout applied to outbound HTTP requests (presence and messenger).
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_request_timeout"
    )]
    pub request_timeout: Duration,

    /// The maximum time in seconds to wait for graceful shutdown.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,

    /// Admin API server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    ///
    /// Values from `{dir}/app.yaml` can be overridden through
    /// `VIGIL__`-prefixed environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("VIGIL").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
