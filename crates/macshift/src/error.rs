//! Error types for interface probing and address changes.

use std::io;
use std::time::Duration;

/// Result type for macshift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing or changing interfaces.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The interface listing could not be obtained or parsed.
    #[error("probe failed: {reason}")]
    Probe {
        /// What went wrong while listing interfaces.
        reason: String,
    },

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },

    /// The interface exists but reports no hardware address.
    #[error("interface {name} does not report a hardware address")]
    AddressNotReported {
        /// The interface name.
        name: String,
    },

    /// An external command could not be started.
    #[error("failed to launch `{command}`: {source}")]
    CommandLaunch {
        /// The command line that failed to start.
        command: String,
        /// The underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// An external command did not finish in time.
    #[error("`{command}` timed out after {}s", timeout.as_secs_f32())]
    CommandTimeout {
        /// The command line that timed out.
        command: String,
        /// The timeout that expired.
        timeout: Duration,
    },

    /// Invalid MAC address text.
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// Invalid interface name.
    #[error("invalid interface name: {0}")]
    InvalidInterfaceName(String),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[cfg(feature = "output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a probe error from anything displayable.
    pub fn probe(reason: impl Into<String>) -> Self {
        Self::Probe {
            reason: reason.into(),
        }
    }

    /// Turn a command failure into a probe error.
    ///
    /// Listing failures are fatal for a run, so launch and timeout errors
    /// raised while probing are reported as probe errors. Other errors are
    /// returned unchanged.
    pub fn into_probe(self) -> Self {
        match self {
            Self::CommandLaunch { .. } | Self::CommandTimeout { .. } => Self::probe(self.to_string()),
            other => other,
        }
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InterfaceNotFound { .. })
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::CommandLaunch { source, .. } | Self::Io(source) => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }

    /// Check if a command exceeded its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::CommandTimeout { .. })
    }

    /// Check if this error should abort the whole run rather than a
    /// single interface.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Probe { .. })
    }
}
