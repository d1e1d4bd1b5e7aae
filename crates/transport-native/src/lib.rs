//! # Native Transport
//!
//! Host serial-port environment for desktop use and hardware bring-up,
//! backed by the `serialport` crate.
//!
//! The browser's user-mediated authorization step maps onto resolving a
//! configured port path: an environment with no port configured "declines"
//! every device request. Port discovery is offered separately so callers can
//! present a choice without gating the request flow on host USB state.

use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

use vaclink_client::{link_info, SerialDevice, SerialEnvironment, WriteChannel};
use vaclink_protocol::{ConnectOptions, LinkError};

/// Port timeout for blocking writes; command payloads are single bytes, so
/// anything slower than this means the port is wedged
const PORT_TIMEOUT_MS: u64 = 500;

/// Serial environment backed by a host serial port
pub struct NativeSerialEnvironment {
    port_path: Option<String>,
}

impl NativeSerialEnvironment {
    /// Environment bound to a specific port path (e.g. `/dev/ttyACM0`)
    pub fn new(port_path: impl Into<String>) -> Self {
        Self {
            port_path: Some(port_path.into()),
        }
    }

    /// Environment with no port configured; every device request fails
    pub fn unconfigured() -> Self {
        Self { port_path: None }
    }

    /// List candidate port paths on this host
    pub fn discover() -> Vec<String> {
        let ports = serialport::available_ports().unwrap_or_default();
        ports.into_iter().map(|p| p.port_name).collect()
    }
}

impl SerialEnvironment for NativeSerialEnvironment {
    type Device = NativePort;

    fn serial_supported(&self) -> bool {
        true
    }

    async fn request_device(&mut self) -> Result<NativePort, LinkError> {
        match &self.port_path {
            Some(path) => Ok(NativePort { path: path.clone() }),
            None => Err(LinkError::Device(
                "no serial port configured - set VACLINK_SERIAL_PORT or pass a path".into(),
            )),
        }
    }
}

/// An authorized (configured) but not yet opened port
pub struct NativePort {
    path: String,
}

impl NativePort {
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SerialDevice for NativePort {
    type Channel = NativeWriteChannel;

    async fn open(&mut self, options: &ConnectOptions) -> Result<NativeWriteChannel, LinkError> {
        let port = serialport::new(&self.path, options.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(PORT_TIMEOUT_MS))
            .open()
            .map_err(|e| LinkError::Device(format!("failed to open {}: {}", self.path, e)))?;

        link_info!("opened {} at {} baud", self.path, options.baud_rate);
        Ok(NativeWriteChannel { port })
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        // The OS handle lives on the write channel; nothing to release here
        Ok(())
    }
}

/// Open port wrapped as a write channel
pub struct NativeWriteChannel {
    port: Box<dyn serialport::SerialPort>,
}

impl WriteChannel for NativeWriteChannel {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port
            .write_all(bytes)
            .map_err(|e| LinkError::Device(format!("write failed: {}", e)))?;
        self.port
            .flush()
            .map_err(|e| LinkError::Device(format!("flush failed: {}", e)))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        // The OS handle is released when the channel is dropped
        Ok(())
    }
}
