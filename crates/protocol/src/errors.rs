//! Error Handling Guidelines
//!
//! Error messages should state what failed and, where known, why. The
//! precondition variants (`UnsupportedEnvironment`, `NoDeviceSelected`,
//! `NotConnected`) carry fixed messages that name the caller action that
//! would resolve them.

use thiserror::Error;

/// Unified error type for serial-link operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The host environment exposes no serial access at all
    #[error("serial access is not available in this environment")]
    UnsupportedEnvironment,

    /// Connect attempted before a device handle was acquired
    #[error("no device selected - call request_device before connect")]
    NoDeviceSelected,

    /// The opened link exposes no writable channel
    #[error("device exposes no writable channel")]
    ChannelUnavailable,

    /// Send attempted while the link is not connected
    #[error("link is not connected")]
    NotConnected,

    /// Status transition was rejected
    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    /// A suspendable operation exceeded its configured deadline
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Operation cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Opaque environment-surfaced failure (user declined the device
    /// prompt, open failed at the driver level, write error, ...)
    #[error("device error: {0}")]
    Device(String),
}

impl From<String> for LinkError {
    fn from(s: String) -> Self {
        LinkError::Device(s)
    }
}

impl From<&str> for LinkError {
    fn from(s: &str) -> Self {
        LinkError::Device(s.to_string())
    }
}
