// src/transport/writer.rs
//! Newline-delimited writer transport

use crate::transport::Transport;
use crate::utils::errors::TransportError;
use parking_lot::Mutex;
use std::io::Write;
use tracing::warn;

/// Writes one message per line to the wrapped writer
pub struct WriterTransport<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_line(&self, message: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock();
        writer.write_all(message.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl WriterTransport<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Transport for WriterTransport<W> {
    fn deliver(&self, message: String) {
        if let Err(e) = self.write_line(&message) {
            warn!("Message lost: {}", e);
        }
    }
}
