//! Test fixture for the application configuration.

use std::time::Duration;

use url::Url;

use crate::config::{AppConfig, ServerConfig};

/// Builds an `AppConfig` with local-only endpoints and the default
/// thresholds, suitable for tests that never perform real I/O.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        presence_base_url: Url::parse("http://presence.invalid/").expect("static URL"),
        messenger_base_url: Url::parse("http://messenger.invalid/").expect("static URL"),
        messenger_token: None,
        sweep_interval: Duration::from_secs(60),
        offline_grace: Duration::from_secs(600),
        renotify_cooldown: Duration::from_secs(600),
        request_timeout: Duration::from_secs(5),
        shutdown_timeout: Duration::from_secs(5),
        server: ServerConfig { enabled: false, listen_address: "127.0.0.1:0".to_string() },
    }
}
