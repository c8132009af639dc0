//! Serial port byte source implementation

use crate::stream::ByteSource;
use async_trait::async_trait;
use p1_core::error::{P1Error, P1Result};
use tokio::io::AsyncReadExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Serial port settings for the P1 interface
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
}

impl SerialSettings {
    /// Create new serial settings with 8N1 defaults
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
        }
    }
}

/// Byte source reading from a P1 serial port
///
/// The P1 port is read-only; there is no write direction.
pub struct SerialByteSource {
    stream: SerialStream,
    closed: bool,
}

impl SerialByteSource {
    /// Open the serial port described by `settings`
    pub fn open(settings: &SerialSettings) -> P1Result<Self> {
        let builder = tokio_serial::new(&settings.port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity)
            .flow_control(settings.flow_control);

        let stream = builder.open_native_async().map_err(|e| {
            P1Error::Source(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open serial port {}: {}", settings.port_name, e),
            ))
        })?;

        Ok(Self {
            stream,
            closed: false,
        })
    }
}

#[async_trait]
impl ByteSource for SerialByteSource {
    async fn read_byte(&mut self) -> P1Result<Option<u8>> {
        if self.closed {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match self.stream.read(&mut buf).await {
            Ok(0) => {
                self.closed = true;
                Ok(None)
            }
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => {
                self.closed = true;
                Err(P1Error::Source(e))
            }
        }
    }
}
