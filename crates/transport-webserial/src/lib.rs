//! # Web Serial Transport
//!
//! Browser serial environment via the Web Serial API. Works in
//! Chromium-based browsers; pages must be served over HTTPS or localhost.
//!
//! Note: usage requires RUSTFLAGS="--cfg=web_sys_unstable_apis"
//!
//! This crate is wasm32-only. Native builds of the workspace compile it to
//! an empty lib so `cargo build` stays green everywhere.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebSerialEnvironment, WebSerialPort, WebSerialWriteChannel};
