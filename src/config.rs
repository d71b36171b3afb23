use crate::constants::{
    DEFAULT_DIAL_DELAY_MS, DEFAULT_DIAL_TIMEOUT_MS, DEFAULT_RANGE_END, DEFAULT_RANGE_START,
    DEFAULT_STORE_URI,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The node's own listening port; also seeded into the registry so the
    /// discovery sweep never dials itself.
    pub port: u16,
    /// Peer discovery sweep configuration (optional)
    pub discovery: Option<DiscoveryConfig>,
    /// Backing tally store configuration (optional)
    pub store: Option<StoreConfig>,
    /// Logging / events configuration
    pub logging: Option<LoggingConfig>,
    pub app_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_RANGE_START,
            discovery: Some(DiscoveryConfig::default()),
            store: Some(StoreConfig::default()),
            logging: None,
            app_name: None,
        }
    }
}

impl Config {
    /// Apply environment overrides. `PORT` takes precedence over the TOML
    /// value (the original deployment provided the listen port via a .env
    /// file); a missing or unparsable value is silently ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("PORT") {
            if let Ok(port) = raw.trim().parse::<u16>() {
                self.port = port;
            }
        }
    }

    /// Resolve the effective discovery settings, filling gaps with defaults.
    pub fn discovery_settings(&self) -> DiscoverySettings {
        let d = self.discovery.clone().unwrap_or_default();
        DiscoverySettings {
            range_start: d.range_start.unwrap_or(DEFAULT_RANGE_START),
            range_end: d.range_end.unwrap_or(DEFAULT_RANGE_END),
            dial_delay: Duration::from_millis(d.dial_delay_ms.unwrap_or(DEFAULT_DIAL_DELAY_MS)),
            dial_timeout: Duration::from_millis(
                d.dial_timeout_ms.unwrap_or(DEFAULT_DIAL_TIMEOUT_MS),
            ),
        }
    }

    pub fn store_uri(&self) -> String {
        self.store
            .as_ref()
            .and_then(|s| s.uri.clone())
            .unwrap_or_else(|| DEFAULT_STORE_URI.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DiscoveryConfig {
    /// Inclusive start of the swept port range
    pub range_start: Option<u16>,
    /// Inclusive end of the swept port range
    pub range_end: Option<u16>,
    /// Milliseconds to wait between per-port attempts within a sweep
    pub dial_delay_ms: Option<u64>,
    /// Milliseconds before an outbound dial is abandoned
    pub dial_timeout_ms: Option<u64>,
}

/// Fully-resolved discovery parameters handed to the sweep loop.
#[derive(Debug, Clone, Copy)]
pub struct DiscoverySettings {
    pub range_start: u16,
    pub range_end: u16,
    pub dial_delay: Duration,
    pub dial_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// Location of the backing tally store. A plain path or a file:// URI.
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Path to JSON line audit log (rotated). If unset, defaults to logs/tallymesh.jsonl
    pub json_path: Option<String>,
    /// Max size in bytes before rotation (default 5MB)
    pub json_max_bytes: Option<usize>,
    /// Number of rotated files to retain (default 3)
    pub json_rotate: Option<u32>,
    /// Disable console sink (default false)
    pub disable_console: Option<bool>,
}
