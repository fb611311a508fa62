//! Core `Config` struct definition.
//!
//! # Sub-modules
//!
//! - [`persistence`]: YAML load/save and path helpers

mod persistence;

use crate::defaults;
use crate::error::ConfigError;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};

/// Tuning for the silent history-capture sub-protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCaptureConfig {
    /// Delay after the first prompt terminator before the capture finalizes
    #[serde(default = "defaults::history_settle_ms")]
    pub settle_ms: u64,
    /// Hard bound after which the capture finalizes regardless of output
    #[serde(default = "defaults::history_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum number of commands kept per session
    #[serde(default = "defaults::history_max_entries")]
    pub max_entries: usize,
    /// How long a connection must stay connected before the first automatic
    /// capture (0 = never capture automatically)
    #[serde(default = "defaults::history_auto_capture_delay_ms")]
    pub auto_capture_delay_ms: u64,
}

impl Default for HistoryCaptureConfig {
    fn default() -> Self {
        Self {
            settle_ms: defaults::history_settle_ms(),
            timeout_ms: defaults::history_timeout_ms(),
            max_entries: defaults::history_max_entries(),
            auto_capture_delay_ms: defaults::history_auto_capture_delay_ms(),
        }
    }
}

/// Multiplexer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket endpoint of the SSH bridge (`ws://` or `wss://`)
    #[serde(default = "defaults::bridge_url")]
    pub bridge_url: String,

    /// Initial terminal surface width in columns
    #[serde(default = "defaults::cols")]
    pub cols: u16,

    /// Initial terminal surface height in rows
    #[serde(default = "defaults::rows")]
    pub rows: u16,

    /// Scrollback kept by each pane's terminal surface
    #[serde(default = "defaults::scrollback_lines")]
    pub scrollback_lines: usize,

    /// Age after which a stored layout is discarded on startup
    #[serde(default = "defaults::layout_expiry_secs")]
    pub layout_expiry_secs: u64,

    /// Prefix key for multiplexer shortcuts (e.g. `ctrl-a`, `ctrl-b`)
    #[serde(default = "defaults::prefix_key")]
    pub prefix_key: String,

    /// Largest accepted authentication secret, in bytes
    #[serde(default = "defaults::max_secret_bytes")]
    pub max_secret_bytes: usize,

    /// History capture tuning
    #[serde(default)]
    pub history_capture: HistoryCaptureConfig,

    /// Log level (overridden by `--log-level` and `RUST_LOG`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_url: defaults::bridge_url(),
            cols: defaults::cols(),
            rows: defaults::rows(),
            scrollback_lines: defaults::scrollback_lines(),
            layout_expiry_secs: defaults::layout_expiry_secs(),
            prefix_key: defaults::prefix_key(),
            max_secret_bytes: defaults::max_secret_bytes(),
            history_capture: HistoryCaptureConfig::default(),
            log_level: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bridge endpoint
    pub fn with_bridge_url(mut self, url: impl Into<String>) -> Self {
        self.bridge_url = url.into();
        self
    }

    /// Set the initial surface dimensions
    pub fn with_dimensions(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Set the layout expiry window
    pub fn with_layout_expiry_secs(mut self, secs: u64) -> Self {
        self.layout_expiry_secs = secs;
        self
    }

    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bridge_url.starts_with("ws://") || self.bridge_url.starts_with("wss://")) {
            return Err(ConfigError::Validation(format!(
                "bridge_url must start with ws:// or wss:// (got '{}')",
                self.bridge_url
            )));
        }
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Validation(
                "cols and rows must be non-zero".to_string(),
            ));
        }
        if self.history_capture.max_entries == 0 {
            return Err(ConfigError::Validation(
                "history_capture.max_entries must be at least 1".to_string(),
            ));
        }
        if self.max_secret_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_secret_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cols, 80);
        assert_eq!(config.rows, 24);
        assert_eq!(config.history_capture.max_entries, 50);
    }

    #[test]
    fn test_rejects_http_bridge_url() {
        let config = Config::new().with_bridge_url("http://example.com/ssh");
        match config.validate() {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("bridge_url")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_zero_history_cap() {
        let mut config = Config::default();
        config.history_capture.max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "bridge_url: wss://bridge.example.com/ws\nhistory_capture:\n  settle_ms: 100\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.bridge_url, "wss://bridge.example.com/ws");
        assert_eq!(config.history_capture.settle_ms, 100);
        assert_eq!(config.history_capture.timeout_ms, 5000);
        assert_eq!(config.layout_expiry_secs, 3600);
        assert!(config.log_level.is_none());
    }
}
