//! # Vaclink Protocol
//!
//! Shared vocabulary for the vacuum-robot control panel:
//!
//! - **LinkStatus**: connection status of the serial link, with transition
//!   validation and UI helpers
//! - **LinkError**: unified error type for link operations
//! - **RobotCommand**: the single-character command alphabet the firmware
//!   understands
//! - **ConnectOptions**: connection parameters (baud rate)

pub mod commands;
pub mod errors;
pub mod options;
pub mod status;

pub use commands::RobotCommand;
pub use errors::LinkError;
pub use options::{ConnectOptions, DEFAULT_BAUD_RATE};
pub use status::LinkStatus;
