use vaclink_protocol::{ConnectOptions, LinkError};

/// A serial environment: whatever the host offers for talking to the robot.
///
/// The three-level split mirrors the shape of browser serial access: an
/// environment that may or may not support serial at all, a device handle
/// acquired through a user-mediated authorization step, and a write channel
/// that only exists while the link is open.
///
/// Implementations live in `transport-webserial` (browser), in
/// `transport-native` (desktop), and in [`crate::mock`] for tests and the
/// simulator.
#[allow(async_fn_in_trait)]
pub trait SerialEnvironment {
    type Device: SerialDevice;

    /// Does this environment expose serial access at all?
    ///
    /// Pure query; must not touch the environment beyond feature detection.
    fn serial_supported(&self) -> bool;

    /// Run the environment's device-authorization flow.
    ///
    /// The user may decline, which surfaces as a [`LinkError::Device`]
    /// failure. Returns an exclusively owned handle to the chosen device.
    async fn request_device(&mut self) -> Result<Self::Device, LinkError>;
}

/// An authorized but not necessarily open serial device.
#[allow(async_fn_in_trait)]
pub trait SerialDevice {
    type Channel: WriteChannel;

    /// Open the link at the configured baud rate and acquire its write
    /// channel.
    ///
    /// Fails with [`LinkError::ChannelUnavailable`] when the opened link
    /// exposes nothing writable; that case is indistinguishable from an open
    /// failure as far as the client's status is concerned.
    async fn open(&mut self, options: &ConnectOptions) -> Result<Self::Channel, LinkError>;

    /// Close the link. Called during teardown, after the write channel has
    /// been closed (or abandoned).
    async fn close(&mut self) -> Result<(), LinkError>;
}

/// The sink through which encoded command bytes reach an open link.
#[allow(async_fn_in_trait)]
pub trait WriteChannel {
    /// Write the full payload. One call corresponds to exactly one write of
    /// the whole byte sequence; there is no partial-write contract.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Close the channel and release it for reuse.
    async fn close(&mut self) -> Result<(), LinkError>;
}
