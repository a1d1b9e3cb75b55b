//! Client configuration
//!
//! Parses the optional `bluechictl` YAML config file that selects which bus
//! to talk to and how.

use crate::error::BluechiError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default per-call timeout, matching the sd-bus default
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

/// Default TCP port used when connecting to a bus over the network
pub const DEFAULT_TCP_PORT: u16 = 55555;

/// Which well-known bus to connect to when no explicit address is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    User,
}

/// bluechictl configuration (all fields optional in the file)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Well-known bus to use
    pub bus: BusKind,
    /// Explicit D-Bus address (e.g., "unix:path=/run/dbus/system_bus_socket")
    pub address: Option<String>,
    /// Remote host reached over SSH ("[user@]host")
    pub host: Option<String>,
    /// Host serving the bus over TCP; turned into a `tcp:` address
    pub tcp_host: Option<String>,
    /// Port for `tcp_host`
    pub tcp_port: u16,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// busctl executable
    pub busctl: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            address: None,
            host: None,
            tcp_host: None,
            tcp_port: DEFAULT_TCP_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            busctl: "busctl".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default location, falling back to defaults
    /// when the file does not exist
    pub fn load_default() -> Result<Self, BluechiError> {
        let path = Self::default_path()?;
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, BluechiError> {
        if !path.exists() {
            return Err(BluechiError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn parse(content: &str) -> Result<Self, BluechiError> {
        // An empty file is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ClientConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config path (~/.config/bluechictl/config.yaml)
    pub fn default_path() -> Result<PathBuf, BluechiError> {
        let dir = dirs_next::config_dir().ok_or(BluechiError::NoConfigDirectory)?;
        Ok(dir.join("bluechictl").join("config.yaml"))
    }

    /// Check field combinations that the file format alone cannot express
    pub fn validate(&self) -> Result<(), BluechiError> {
        if self.timeout_secs == 0 {
            return Err(BluechiError::ConfigInvalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.address.is_some() && self.tcp_host.is_some() {
            return Err(BluechiError::ConfigInvalid(
                "address and tcp_host are mutually exclusive".to_string(),
            ));
        }
        if self.busctl.trim().is_empty() {
            return Err(BluechiError::ConfigInvalid(
                "busctl must name an executable".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
bus: user
host: admin@controller.example.com
timeout_secs: 5
"#;
        let config = ClientConfig::parse(yaml).unwrap();
        assert_eq!(config.bus, BusKind::User);
        assert_eq!(config.host.as_deref(), Some("admin@controller.example.com"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.tcp_port, DEFAULT_TCP_PORT);
        assert_eq!(config.busctl, "busctl");
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ClientConfig::parse("").unwrap(), ClientConfig::default());
        assert_eq!(ClientConfig::parse("\n  \n").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ClientConfig::parse("colour: blue\n").unwrap_err();
        assert!(matches!(err, BluechiError::Yaml(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::parse("timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, BluechiError::ConfigInvalid(_)));
    }

    #[test]
    fn test_address_and_tcp_host_conflict() {
        let yaml = r#"
address: unix:path=/run/dbus/system_bus_socket
tcp_host: 10.0.0.1
"#;
        let err = ClientConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, BluechiError::ConfigInvalid(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load_from(Path::new("/nonexistent/bluechictl/config.yaml"))
            .unwrap_err();
        assert!(matches!(err, BluechiError::ConfigNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "bluechictl-config-test-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "tcp_host: 192.168.1.10\ntcp_port: 842\n").unwrap();
        let config = ClientConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.tcp_host.as_deref(), Some("192.168.1.10"));
        assert_eq!(config.tcp_port, 842);
        assert_eq!(config.bus, BusKind::System);
    }

    #[test]
    fn test_default_path() {
        if let Ok(path) = ClientConfig::default_path() {
            assert!(path.ends_with("bluechictl/config.yaml"));
        }
    }
}
