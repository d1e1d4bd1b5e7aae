use serde::{Deserialize, Serialize};

/// # Link Status
///
/// Status of the serial link to the robot. Exactly one value is active at a
/// time; a fresh client starts in `Disconnected`.
///
/// ## State Transition Diagram
///
/// ```text
/// Disconnected --connect--> Connecting --open succeeds--> Connected
/// Connecting   --open fails-----------> Error
/// Connected    --write fails----------> Lost
/// Error        --connect--> Connecting            (explicit retry)
/// Lost         --connect--> Connecting            (fresh attempt)
/// any state    --disconnect--> Disconnected       (always succeeds)
/// ```
///
/// ## Invariants
///
/// - **Disconnected**: no device open, no write channel, ready to connect
/// - **Connecting**: open attempt in flight, observable before it resolves
/// - **Connected**: link open, write channel held (exists iff `Connected`)
/// - **Error**: last connect attempt failed; retry allowed via `connect`
/// - **Lost**: a write failed on an open link; the channel has been dropped
///   and only a fresh `connect` recovers
///
/// There is no automatic recovery out of `Error` or `Lost` — retries are
/// always an explicit caller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    /// No active connection, ready to connect
    Disconnected,

    /// Open attempt in flight
    Connecting,

    /// Link open and writable
    Connected,

    /// Last connect attempt failed
    Error,

    /// Link dropped out from under a connected client (failed write)
    Lost,
}

impl LinkStatus {
    /// Can a new connect attempt begin from this status?
    pub fn can_begin_connect(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Error | Self::Lost)
    }

    /// Validate if transition to `new_status` is allowed from current status
    pub fn can_transition_to(&self, new_status: LinkStatus) -> bool {
        use LinkStatus::*;

        match (self, new_status) {
            // Disconnect is always permitted, from every state
            (_, Disconnected) => true,

            // Beginning an open attempt
            (Disconnected, Connecting) => true,
            (Error, Connecting) => true, // Retry after failure
            (Lost, Connecting) => true,  // Fresh attempt after a dead link

            // Resolution of an open attempt
            (Connecting, Connected) => true,
            (Connecting, Error) => true,

            // A failed write on an open link
            (Connected, Lost) => true,

            // All other transitions are invalid
            _ => false,
        }
    }

    /// User-facing status text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Error => "Connection error",
            Self::Lost => "Link lost - reconnect required",
        }
    }

    /// What color should the status indicator be?
    pub fn indicator_color(&self) -> &'static str {
        match self {
            Self::Connected => "rgb(95, 200, 85)",     // Green
            Self::Disconnected => "rgb(240, 105, 95)", // Red
            Self::Error | Self::Lost => "rgb(240, 105, 95)", // Red
            Self::Connecting => "rgb(245, 190, 80)",   // Orange
        }
    }
}
