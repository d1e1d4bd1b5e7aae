//! # Vaclink Client
//!
//! Connection-lifecycle core for the vacuum-robot control panel.
//!
//! This crate defines:
//! - **SerialLinkClient**: owns the one-at-a-time connection to the robot and
//!   mediates all writes to it
//! - **Environment traits**: the seam between the client and whatever
//!   actually provides serial access (Web Serial in the browser, a native
//!   port, or the mock)
//! - **Supervision**: per-operation timeouts so a hung open/write/close never
//!   strands a caller
//! - **Cancellation**: caller-suppliable tokens raced against suspendable
//!   operations
//!
//! ## Architecture
//!
//! The client serializes every lifecycle operation (request-device, connect,
//! send, disconnect) through one internal async mutex, so overlapping calls
//! queue instead of corrupting the shared handles. Status changes are
//! published synchronously to registered subscribers; that is the only
//! signaling path out of the client.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod cancellation;
pub mod client;
pub mod env;
pub mod logging;
pub mod mock;
pub mod subscribers;
pub mod supervision;

pub use cancellation::CancelToken;
pub use client::SerialLinkClient;
pub use env::{SerialDevice, SerialEnvironment, WriteChannel};
pub use subscribers::Subscription;
pub use supervision::LinkTimeouts;
