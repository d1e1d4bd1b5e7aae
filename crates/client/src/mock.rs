//! Scriptable in-memory serial environment
//!
//! Drives the client in tests and powers the CLI's simulator mode. Every
//! environment call can be scripted to succeed, fail with a message, or hang
//! forever (for timeout and cancellation coverage), and every write is
//! recorded for inspection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future;
use vaclink_protocol::{ConnectOptions, LinkError};

use crate::env::{SerialDevice, SerialEnvironment, WriteChannel};

/// What a scripted operation should do when invoked
#[derive(Debug, Clone, Default)]
pub enum MockOutcome {
    /// Resolve successfully
    #[default]
    Succeed,
    /// Fail with an opaque device error carrying this message
    Fail(String),
    /// Never resolve (for timeout and cancellation tests)
    Hang,
}

#[derive(Clone)]
struct Behavior {
    supported: bool,
    request: MockOutcome,
    open: MockOutcome,
    channel_available: bool,
    write: MockOutcome,
    close_fails: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            supported: true,
            request: MockOutcome::Succeed,
            open: MockOutcome::Succeed,
            channel_available: true,
            write: MockOutcome::Succeed,
            close_fails: false,
        }
    }
}

struct MockState {
    behavior: Mutex<Behavior>,
    request_calls: AtomicUsize,
    open_calls: AtomicUsize,
    writes: Mutex<Vec<Vec<u8>>>,
}

impl MockState {
    fn behavior(&self) -> Behavior {
        recover(self.behavior.lock()).clone()
    }
}

fn recover<'a, T>(result: std::sync::LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    match result {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

async fn resolve(outcome: MockOutcome) -> Result<(), LinkError> {
    match outcome {
        MockOutcome::Succeed => Ok(()),
        MockOutcome::Fail(msg) => Err(LinkError::Device(msg)),
        MockOutcome::Hang => future::pending().await,
    }
}

/// Scriptable serial environment
pub struct MockEnvironment {
    state: Arc<MockState>,
}

impl MockEnvironment {
    /// Environment where everything succeeds
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                behavior: Mutex::new(Behavior::default()),
                request_calls: AtomicUsize::new(0),
                open_calls: AtomicUsize::new(0),
                writes: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Environment with no serial capability at all
    pub fn unsupported() -> Self {
        let env = Self::new();
        recover(env.state.behavior.lock()).supported = false;
        env
    }

    /// Inspection-and-rescripting handle, usable after the environment has
    /// been moved into a client
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: self.state.clone(),
        }
    }

    /// The user declines the device prompt
    pub fn deny_request(self) -> Self {
        recover(self.state.behavior.lock()).request =
            MockOutcome::Fail("device selection declined".into());
        self
    }

    pub fn fail_open(self, msg: &str) -> Self {
        recover(self.state.behavior.lock()).open = MockOutcome::Fail(msg.into());
        self
    }

    pub fn hang_on_open(self) -> Self {
        recover(self.state.behavior.lock()).open = MockOutcome::Hang;
        self
    }

    /// The link opens but exposes no writable channel
    pub fn without_write_channel(self) -> Self {
        recover(self.state.behavior.lock()).channel_available = false;
        self
    }

    pub fn fail_writes(self, msg: &str) -> Self {
        recover(self.state.behavior.lock()).write = MockOutcome::Fail(msg.into());
        self
    }

    /// Both close operations (channel and device) fail
    pub fn fail_close(self) -> Self {
        recover(self.state.behavior.lock()).close_fails = true;
        self
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Clonable handle for inspecting and rescripting a [`MockEnvironment`]
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

impl MockHandle {
    /// How many times the authorization flow ran
    pub fn request_calls(&self) -> usize {
        self.state.request_calls.load(Ordering::Relaxed)
    }

    /// How many open attempts the device saw
    pub fn open_calls(&self) -> usize {
        self.state.open_calls.load(Ordering::Relaxed)
    }

    /// Every write the channel received, one entry per `write` call
    pub fn writes(&self) -> Vec<Vec<u8>> {
        recover(self.state.writes.lock()).clone()
    }

    /// All written bytes, flattened in order
    pub fn written_bytes(&self) -> Vec<u8> {
        self.writes().concat()
    }

    /// Rescript write behavior mid-test (e.g. make a healthy link die)
    pub fn set_write(&self, outcome: MockOutcome) {
        recover(self.state.behavior.lock()).write = outcome;
    }

    /// Rescript open behavior mid-test (e.g. let a retry succeed)
    pub fn set_open(&self, outcome: MockOutcome) {
        recover(self.state.behavior.lock()).open = outcome;
    }
}

impl SerialEnvironment for MockEnvironment {
    type Device = MockDevice;

    fn serial_supported(&self) -> bool {
        self.state.behavior().supported
    }

    async fn request_device(&mut self) -> Result<MockDevice, LinkError> {
        self.state.request_calls.fetch_add(1, Ordering::Relaxed);
        resolve(self.state.behavior().request).await?;
        Ok(MockDevice {
            state: self.state.clone(),
        })
    }
}

/// Device handle produced by [`MockEnvironment`]
pub struct MockDevice {
    state: Arc<MockState>,
}

impl SerialDevice for MockDevice {
    type Channel = MockChannel;

    async fn open(&mut self, _options: &ConnectOptions) -> Result<MockChannel, LinkError> {
        self.state.open_calls.fetch_add(1, Ordering::Relaxed);
        let behavior = self.state.behavior();
        resolve(behavior.open).await?;
        if !behavior.channel_available {
            return Err(LinkError::ChannelUnavailable);
        }
        Ok(MockChannel {
            state: self.state.clone(),
        })
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        if self.state.behavior().close_fails {
            return Err(LinkError::Device("device close failed".into()));
        }
        Ok(())
    }
}

/// Write channel produced by [`MockDevice`]
pub struct MockChannel {
    state: Arc<MockState>,
}

impl WriteChannel for MockChannel {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        resolve(self.state.behavior().write).await?;
        recover(self.state.writes.lock()).push(bytes.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        if self.state.behavior().close_fails {
            return Err(LinkError::Device("channel close failed".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_writes_in_order() {
        let mut env = MockEnvironment::new();
        let handle = env.handle();

        let mut device = env.request_device().await.unwrap();
        let mut channel = device.open(&ConnectOptions::default()).await.unwrap();

        channel.write(b"w").await.unwrap();
        channel.write(b"p").await.unwrap();

        assert_eq!(handle.writes(), vec![b"w".to_vec(), b"p".to_vec()]);
        assert_eq!(handle.written_bytes(), b"wp".to_vec());
    }

    #[tokio::test]
    async fn test_denied_request_surfaces_as_device_error() {
        let mut env = MockEnvironment::new().deny_request();
        match env.request_device().await {
            Err(LinkError::Device(msg)) => assert!(msg.contains("declined")),
            other => panic!("Expected Device error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_missing_channel() {
        let mut env = MockEnvironment::new().without_write_channel();
        let mut device = env.request_device().await.unwrap();
        let result = device.open(&ConnectOptions::default()).await;
        assert!(matches!(result, Err(LinkError::ChannelUnavailable)));
    }

    #[tokio::test]
    async fn test_rescripting_through_handle() {
        let mut env = MockEnvironment::new();
        let handle = env.handle();

        let mut device = env.request_device().await.unwrap();
        let mut channel = device.open(&ConnectOptions::default()).await.unwrap();

        handle.set_write(MockOutcome::Fail("cable pulled".into()));
        assert!(channel.write(b"w").await.is_err());

        handle.set_write(MockOutcome::Succeed);
        assert!(channel.write(b"w").await.is_ok());
    }
}
