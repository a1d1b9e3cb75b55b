//! Error types for the bluechi client

use thiserror::Error;

/// Errors returned by the bluechi client
#[derive(Error, Debug)]
pub enum BluechiError {
    /// The bus exchange itself failed (connection, timeout, remote rejection,
    /// or a reply that could not be read at all)
    #[error("Failed to issue method call: {0}")]
    Transport(String),

    /// The reply was well-formed but did not have the expected shape
    #[error("Failed to parse reply: {0}")]
    Protocol(String),

    /// Caller-supplied input was rejected before anything was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Host name could not be turned into an IP address
    #[error("Failed to resolve '{host}': {reason}")]
    AddressResolution { host: String, reason: String },

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Could not determine the user configuration directory")]
    NoConfigDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BluechiError {
    /// Whether this error came from the exchange rather than from the reply contents
    pub fn is_transport(&self) -> bool {
        matches!(self, BluechiError::Transport(_))
    }

    /// Whether the reply was received but had an unexpected shape
    pub fn is_protocol(&self) -> bool {
        matches!(self, BluechiError::Protocol(_))
    }
}
