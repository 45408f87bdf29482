//! BlackBox CLI Configuration Management
//!
//! Configuration is read from an optional TOML file and then overridden by
//! command line flags: CLI args > config file > defaults. Every section has
//! defaults, so a file only needs the keys it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use blackbox_core::DEFAULT_TOPIC;

use crate::cli::Cli;

/// Default TCP listen port
pub const DEFAULT_PORT: u16 = 4001;

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the BlackBox CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub node: NodeConfig,
    pub chat: ChatConfig,
    pub timeouts: TimeoutConfig,
}

/// Network node options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// TCP port for the IPv4 and IPv6 listeners
    pub port: u16,

    /// Relay multiaddrs; empty disables relay assistance
    pub relays: Vec<String>,

    /// Directory for identity keys (defaults to the user config dir)
    pub data_dir: Option<PathBuf>,
}

/// Chat presentation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Gossip topic every participant joins
    pub topic: String,

    /// Input prompt
    pub prompt: String,

    /// Whether to use coloured output
    pub color: bool,
}

/// Startup timing, in the units named by each key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub probe_ms: u64,
    pub dial_secs: u64,
    pub relay_wait_secs: u64,
    pub relay_poll_ms: u64,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            relays: Vec::new(),
            data_dir: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            prompt: "> ".to_string(),
            color: true,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe_ms: 1500,
            dial_secs: 20,
            relay_wait_secs: 20,
            relay_poll_ms: 750,
        }
    }
}

impl TimeoutConfig {
    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    pub fn dial(&self) -> Duration {
        Duration::from_secs(self.dial_secs)
    }

    pub fn relay_wait(&self) -> Duration {
        Duration::from_secs(self.relay_wait_secs)
    }

    pub fn relay_poll(&self) -> Duration {
        Duration::from_millis(self.relay_poll_ms)
    }
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileSystem(format!("{}: {e}", path.display())))?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError::Loading(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command line flags on top of the loaded values
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.node.port = port;
        }
        if let Some(relays) = &cli.relays {
            self.node.relays = vec![relays.clone()];
        }
        if let Some(data_dir) = &cli.data_dir {
            self.node.data_dir = Some(data_dir.clone());
        }
        if cli.no_color {
            self.chat.color = false;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.port == 0 {
            return Err(ConfigError::Validation("node.port must be non-zero".to_string()));
        }
        if self.chat.topic.trim().is_empty() {
            return Err(ConfigError::Validation("chat.topic must not be empty".to_string()));
        }

        let timeouts = [
            ("timeouts.probe_ms", self.timeouts.probe_ms),
            ("timeouts.dial_secs", self.timeouts.dial_secs),
            ("timeouts.relay_wait_secs", self.timeouts.relay_wait_secs),
            ("timeouts.relay_poll_ms", self.timeouts.relay_poll_ms),
        ];
        if let Some((key, _)) = timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Validation(format!("{key} must be non-zero")));
        }

        Ok(())
    }

    /// Relay entries as one comma separated list
    pub fn relay_csv(&self) -> String {
        self.node.relays.join(",")
    }

    /// Directory the identity keys live in
    pub fn data_dir(&self) -> PathBuf {
        self.node.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// `<config dir>/blackbox`, falling back to `~/.blackbox`
pub fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("blackbox"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".blackbox")))
        .unwrap_or_else(|| PathBuf::from(".blackbox"))
}

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {0}")]
    Loading(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("File system error: {0}")]
    FileSystem(String),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config_creation() {
        let config = AppConfig::default();
        assert_eq!(config.node.port, 4001);
        assert!(config.node.relays.is_empty());
        assert_eq!(config.chat.topic, "blackbox/lobby");
        assert_eq!(config.timeouts.probe(), Duration::from_millis(1500));
        assert_eq!(config.timeouts.relay_wait(), Duration::from_secs(20));
        assert_eq!(config.timeouts.relay_poll(), Duration::from_millis(750));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.node.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.chat.topic = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.timeouts.relay_poll_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("relay_poll_ms"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blackbox.toml");
        std::fs::write(&path, "[node]\nport = 5001\n\n[chat]\ncolor = false\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.node.port, 5001);
        assert!(!config.chat.color);
        assert_eq!(config.chat.prompt, "> ");
        assert_eq!(config.timeouts, TimeoutConfig::default());
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blackbox.toml");
        std::fs::write(&path, "[node]\nport = \"four\"\n").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::Loading(_))
        ));

        assert!(matches!(
            AppConfig::load_from_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileSystem(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = AppConfig::default();
        config.node.relays = vec!["/ip4/1.2.3.4/tcp/4001/p2p/x".to_string()];

        let cli = Cli::try_parse_from([
            "blackbox",
            "--port",
            "4100",
            "--relays",
            "a, b",
            "--data-dir",
            "/tmp/bb",
            "--no-color",
        ])
        .unwrap();
        config.apply_overrides(&cli);

        assert_eq!(config.node.port, 4100);
        assert_eq!(config.relay_csv(), "a, b");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/bb"));
        assert!(!config.chat.color);
    }
}
