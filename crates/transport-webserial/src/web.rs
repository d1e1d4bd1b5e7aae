use js_sys::Uint8Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{SerialOptions, SerialPort, WritableStreamDefaultWriter};

use vaclink_client::{SerialDevice, SerialEnvironment, WriteChannel};
use vaclink_protocol::{ConnectOptions, LinkError};

/// WebSerial API errors are opaque JsValues; carry their debug form
fn js_error(context: &str, err: JsValue) -> LinkError {
    LinkError::Device(format!("{}: {:?}", context, err))
}

/// Browser serial environment (`navigator.serial`)
#[derive(Default)]
pub struct WebSerialEnvironment;

impl WebSerialEnvironment {
    pub fn new() -> Self {
        Self
    }
}

impl SerialEnvironment for WebSerialEnvironment {
    type Device = WebSerialPort;

    fn serial_supported(&self) -> bool {
        // "serial" in navigator - absent outside Chromium-based browsers
        match web_sys::window() {
            Some(window) => {
                js_sys::Reflect::has(&window.navigator(), &"serial".into()).unwrap_or(false)
            }
            None => false,
        }
    }

    async fn request_device(&mut self) -> Result<WebSerialPort, LinkError> {
        let window =
            web_sys::window().ok_or_else(|| LinkError::Device("no window object".into()))?;
        let serial = window.navigator().serial();

        // The user picks a port from the browser prompt; declining rejects
        // the promise
        let port_val = JsFuture::from(serial.request_port())
            .await
            .map_err(|e| js_error("device selection failed", e))?;
        let port: SerialPort = port_val
            .dyn_into()
            .map_err(|_| LinkError::Device("SerialPort cast failed".into()))?;

        Ok(WebSerialPort { port })
    }
}

/// A user-authorized browser serial port
pub struct WebSerialPort {
    port: SerialPort,
}

impl SerialDevice for WebSerialPort {
    type Channel = WebSerialWriteChannel;

    async fn open(&mut self, options: &ConnectOptions) -> Result<WebSerialWriteChannel, LinkError> {
        let serial_options = SerialOptions::new(options.baud_rate);

        JsFuture::from(self.port.open(&serial_options))
            .await
            .map_err(|e| js_error("failed to open port", e))?;

        // An open port with nothing writable is indistinguishable from an
        // open failure as far as the caller is concerned
        let writable = self.port.writable();
        let stream: web_sys::WritableStream = writable
            .dyn_into()
            .map_err(|_| LinkError::ChannelUnavailable)?;

        let writer_val = stream
            .get_writer()
            .map_err(|_| LinkError::ChannelUnavailable)?;
        let writer: WritableStreamDefaultWriter = writer_val
            .dyn_into()
            .map_err(|_| LinkError::ChannelUnavailable)?;

        Ok(WebSerialWriteChannel { writer })
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        JsFuture::from(self.port.close())
            .await
            .map_err(|e| js_error("failed to close port", e))?;
        Ok(())
    }
}

/// Writer lock over the open port's writable stream
pub struct WebSerialWriteChannel {
    writer: WritableStreamDefaultWriter,
}

impl WriteChannel for WebSerialWriteChannel {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let chunk = Uint8Array::from(bytes);
        JsFuture::from(self.writer.write_with_chunk(&chunk))
            .await
            .map_err(|e| js_error("write failed", e))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        let result = JsFuture::from(self.writer.close()).await;
        // The stream lock must come back even when closing fails
        self.writer.release_lock();
        result.map_err(|e| js_error("failed to close writer", e))?;
        Ok(())
    }
}
