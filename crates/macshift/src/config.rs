//! Runtime configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use macshift::config::{Backend, Config};
//!
//! let config = Config::new()
//!     .with_backend(Backend::IpRoute2)
//!     .with_command_timeout(Duration::from_secs(3));
//!
//! assert_eq!(config.backend, Backend::IpRoute2);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::command::DEFAULT_TIMEOUT;

/// Which interface control tool to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// `ip` if installed, otherwise `ifconfig`.
    #[default]
    Auto,
    /// iproute2 `ip`.
    IpRoute2,
    /// net-tools `ifconfig`.
    Ifconfig,
}

impl Backend {
    /// Name accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::IpRoute2 => "ip",
            Self::Ifconfig => "ifconfig",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "ip" | "iproute2" => Ok(Self::IpRoute2),
            "ifconfig" => Ok(Self::Ifconfig),
            other => Err(format!(
                "unknown backend '{}' (expected auto, ip or ifconfig)",
                other
            )),
        }
    }
}

/// Settings shared by every operation of a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface control tool.
    pub backend: Backend,
    /// Upper bound on each external command.
    pub command_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            command_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the per-command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}
