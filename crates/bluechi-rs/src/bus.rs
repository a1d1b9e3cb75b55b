//! Bus connection
//!
//! [`Bus`] is the single capability the rest of the client needs: issue one
//! method call and hand back the decoded reply. [`BusctlConnection`]
//! implements it by running `busctl --json=short call` and parsing what it
//! prints, so no D-Bus library has to be linked.

use crate::config::{BusKind, ClientConfig};
use crate::error::BluechiError;
use crate::message::Message;
use std::time::{Duration, Instant};

/// Extra time granted to busctl beyond its own `--timeout` before it is killed
const TIMEOUT_GRACE: Duration = Duration::from_secs(2);

/// A connection able to perform method calls without arguments
#[allow(async_fn_in_trait)]
pub trait Bus {
    /// Call `interface.member` on `path` at `destination` and wait for the reply
    async fn call_method(
        &self,
        destination: &str,
        path: &str,
        interface: &str,
        member: &str,
    ) -> Result<Message, BluechiError>;
}

/// How busctl should reach the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusTarget {
    System,
    User,
    /// Explicit D-Bus address
    Address(String),
}

/// Bus connection backed by the `busctl` tool
#[derive(Debug, Clone)]
pub struct BusctlConnection {
    program: String,
    target: BusTarget,
    /// Remote host reached over SSH
    host: Option<String>,
    timeout: Duration,
}

impl BusctlConnection {
    /// Connection to the system bus with default settings
    pub fn system() -> Self {
        Self {
            program: "busctl".to_string(),
            target: BusTarget::System,
            host: None,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Connection described by a config file
    ///
    /// `tcp_host` is not resolved here; callers that want it turn it into an
    /// address first and pass it through [`BusctlConnection::with_target`].
    pub fn from_config(config: &ClientConfig) -> Self {
        let target = match (&config.address, config.bus) {
            (Some(address), _) => BusTarget::Address(address.clone()),
            (None, BusKind::System) => BusTarget::System,
            (None, BusKind::User) => BusTarget::User,
        };
        Self {
            program: config.busctl.clone(),
            target,
            host: config.host.clone(),
            timeout: config.timeout(),
        }
    }

    /// Replace the bus target
    pub fn with_target(mut self, target: BusTarget) -> Self {
        self.target = target;
        self
    }

    /// Reach the bus on a remote host over SSH
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different busctl executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn target(&self) -> &BusTarget {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments passed to busctl for one call
    pub fn call_args(
        &self,
        destination: &str,
        path: &str,
        interface: &str,
        member: &str,
    ) -> Vec<String> {
        let mut args = vec!["--json=short".to_string(), "--no-pager".to_string()];
        match &self.target {
            BusTarget::System => args.push("--system".to_string()),
            BusTarget::User => args.push("--user".to_string()),
            BusTarget::Address(address) => args.push(format!("--address={}", address)),
        }
        if let Some(host) = &self.host {
            args.push(format!("--host={}", host));
        }
        // busctl accepts a bare number of seconds
        args.push(format!("--timeout={}", self.timeout.as_secs().max(1)));
        args.extend(
            ["call", destination, path, interface, member]
                .iter()
                .map(|s| s.to_string()),
        );
        args
    }
}

impl Bus for BusctlConnection {
    async fn call_method(
        &self,
        destination: &str,
        path: &str,
        interface: &str,
        member: &str,
    ) -> Result<Message, BluechiError> {
        let args = self.call_args(destination, path, interface, member);
        tracing::debug!(
            "Calling {}.{} on {} at {}",
            interface,
            member,
            path,
            destination
        );

        let started = Instant::now();
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout + TIMEOUT_GRACE, command.output())
            .await
            .map_err(|_| {
                BluechiError::Transport(format!(
                    "{}.{} timed out after {}s",
                    interface,
                    member,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                BluechiError::Transport(format!("failed to run {}: {}", self.program, e))
            })?;

        tracing::debug!(
            "{}.{} finished in {:?} ({})",
            interface,
            member,
            started.elapsed(),
            output.status
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            return Err(BluechiError::Transport(if message.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                message.to_string()
            }));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Message::from_busctl_json(&stdout)
    }
}
