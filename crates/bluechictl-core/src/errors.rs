//! Error formatting utilities
//!
//! Provides user-friendly error message formatting for bluechi client errors.

use bluechi_rs::BluechiError;

/// Format a BluechiError into a user-friendly message
///
/// # Examples
///
/// ```
/// use bluechictl_core::errors::format_bluechi_error;
/// use bluechi_rs::BluechiError;
///
/// let error = BluechiError::Transport("Connection refused".to_string());
/// let message = format_bluechi_error(&error);
/// assert!(message.contains("refused"));
/// ```
pub fn format_bluechi_error(error: &BluechiError) -> String {
    match error {
        BluechiError::Transport(msg) => format_transport_error(msg),
        BluechiError::Protocol(msg) => format!("Unexpected reply from bluechi: {}", msg),
        BluechiError::InvalidArgument(msg) => format!("Invalid argument: {}", msg),
        BluechiError::ConfigNotFound(path) => format!("Config not found: {}", path),
        BluechiError::ConfigInvalid(msg) => format!("Invalid config: {}", msg),
        _ => error.to_string(),
    }
}

/// Format a failed method call
fn format_transport_error(msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("failed to run") {
        format!("{} - is busctl (systemd) installed?", msg)
    } else if lower.contains("not activatable") || lower.contains("serviceunknown") {
        format!("{} - is the bluechi controller running on this bus?", msg)
    } else if lower.contains("unknown object") || lower.contains("unknownobject") {
        format!("Failed to issue method call: {} - does the node exist?", msg)
    } else if lower.contains("access denied") || lower.contains("permission denied") {
        format!("{} - try again as root or with the user bus", msg)
    } else if lower.contains("timed out") || lower.contains("timeout") {
        format!("{} - node may be slow or unreachable", msg)
    } else if lower.contains("refused") || lower.contains("no such file") {
        format!("{} - is the bus address correct?", msg)
    } else {
        format!("Failed to issue method call: {}", msg)
    }
}

/// Categorize an error for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bus/connection issues
    Network,
    /// Authorization issues
    Auth,
    /// Configuration issues
    Config,
    /// Timeout issues
    Timeout,
    /// Node or object not found
    NotFound,
    /// Malformed or unexpected reply
    Protocol,
    /// Bad user input
    Usage,
    /// Other/unknown issues
    Other,
}

impl ErrorCategory {
    /// Get a short label for the category
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network",
            ErrorCategory::Auth => "Auth",
            ErrorCategory::Config => "Config",
            ErrorCategory::Timeout => "Timeout",
            ErrorCategory::NotFound => "Not Found",
            ErrorCategory::Protocol => "Protocol",
            ErrorCategory::Usage => "Usage",
            ErrorCategory::Other => "Error",
        }
    }

    /// Process exit code for errors of this category
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCategory::Usage => 2,
            _ => 1,
        }
    }
}

/// Categorize a BluechiError
pub fn categorize_error(error: &BluechiError) -> ErrorCategory {
    match error {
        BluechiError::Transport(msg) => {
            let lower = msg.to_lowercase();
            if lower.contains("timed out") || lower.contains("timeout") {
                ErrorCategory::Timeout
            } else if lower.contains("access denied") || lower.contains("permission denied") {
                ErrorCategory::Auth
            } else if lower.contains("unknown object") || lower.contains("unknownobject") {
                ErrorCategory::NotFound
            } else {
                ErrorCategory::Network
            }
        }
        BluechiError::Protocol(_) => ErrorCategory::Protocol,
        BluechiError::InvalidArgument(_) => ErrorCategory::Usage,
        BluechiError::AddressResolution { .. } => ErrorCategory::Network,
        BluechiError::ConfigNotFound(_)
        | BluechiError::ConfigInvalid(_)
        | BluechiError::NoConfigDirectory
        | BluechiError::Yaml(_) => ErrorCategory::Config,
        BluechiError::Io(_) => ErrorCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_transport_error() {
        assert_eq!(
            format_transport_error("Connection refused"),
            "Connection refused - is the bus address correct?"
        );
        assert_eq!(
            format_transport_error("Connection timed out"),
            "Connection timed out - node may be slow or unreachable"
        );
        assert_eq!(
            format_transport_error("Access denied"),
            "Access denied - try again as root or with the user bus"
        );
        assert!(
            format_transport_error("The name org.eclipse.bluechi was not provided by any .service files, not activatable")
                .ends_with("is the bluechi controller running on this bus?")
        );
        assert_eq!(
            format_transport_error("something odd"),
            "Failed to issue method call: something odd"
        );
    }

    #[test]
    fn test_transport_error_keeps_remote_message() {
        for msg in [
            "Call failed: The name org.eclipse.bluechi is not activatable",
            "Call failed: Access denied",
            "Call failed: Connection timed out",
            "Failed to connect to bus: Connection refused",
            "Failed to connect to bus: No such file or directory",
            "Call failed: Unknown object '/org/eclipse/bluechi/node/x'",
            "failed to run busctl: No such file or directory",
            "something odd",
        ] {
            let error = BluechiError::Transport(msg.to_string());
            assert!(format_bluechi_error(&error).contains(msg), "{}", msg);
        }
    }

    #[test]
    fn test_format_protocol_error() {
        let error = BluechiError::Protocol("expected 'a(ss)'".to_string());
        assert!(format_bluechi_error(&error).starts_with("Unexpected reply"));
    }

    #[test]
    fn test_categorize_transport_error() {
        let error = BluechiError::Transport("Connection refused".to_string());
        assert_eq!(categorize_error(&error), ErrorCategory::Network);

        let error = BluechiError::Transport("Access denied".to_string());
        assert_eq!(categorize_error(&error), ErrorCategory::Auth);

        let error = BluechiError::Transport("ListUnits timed out after 25s".to_string());
        assert_eq!(categorize_error(&error), ErrorCategory::Timeout);

        let error = BluechiError::Transport("Unknown object '/org/eclipse/bluechi/node/x'".to_string());
        assert_eq!(categorize_error(&error), ErrorCategory::NotFound);
    }

    #[test]
    fn test_categorize_other_errors() {
        let error = BluechiError::InvalidArgument("bad".to_string());
        assert_eq!(categorize_error(&error), ErrorCategory::Usage);
        assert_eq!(categorize_error(&error).exit_code(), 2);

        let error = BluechiError::ConfigNotFound("/path".to_string());
        assert_eq!(categorize_error(&error), ErrorCategory::Config);
        assert_eq!(categorize_error(&error).exit_code(), 1);

        let error = BluechiError::Protocol("x".to_string());
        assert_eq!(categorize_error(&error).label(), "Protocol");
    }
}
