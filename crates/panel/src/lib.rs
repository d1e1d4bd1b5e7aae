//! # Vaclink Panel
//!
//! Presentation-layer contract for the vacuum-robot control panel: the
//! non-visual state and behavior every rendering of the panel shares.
//!
//! The [`ControlPanel`] wires user actions (connect, disconnect, movement,
//! suction, keyboard shortcuts) to a [`SerialLinkClient`](vaclink_client::SerialLinkClient),
//! gates command dispatch on the link being connected, and routes
//! user-facing feedback through a [`Notifier`] seam so any toast
//! implementation can plug in.

pub mod config;
pub mod panel;

pub use config::PanelConfig;
pub use panel::{ControlPanel, Notifier, UNSUPPORTED_ADVISORY};
