// src/transport/channel.rs
//! Channel-backed transport
//!
//! Interceptions run on the target's threads; this transport moves their
//! messages to a single consumer without blocking the caller.

use crate::transport::Transport;
use crate::utils::errors::TransportError;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::warn;

/// Sends each message over a crossbeam channel
pub struct ChannelTransport {
    sender: Sender<String>,
}

impl ChannelTransport {
    /// Create a transport and the receiver consuming it
    pub fn unbounded() -> (Self, Receiver<String>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Create a transport over a bounded channel
    ///
    /// When the channel is full the message is dropped rather than
    /// blocking the intercepted call.
    pub fn bounded(capacity: usize) -> (Self, Receiver<String>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self { sender }, receiver)
    }

    pub fn from_sender(sender: Sender<String>) -> Self {
        Self { sender }
    }

    fn try_deliver(&self, message: String) -> Result<(), TransportError> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("Transport channel full, dropping message");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(TransportError::Disconnected),
        }
    }
}

impl Transport for ChannelTransport {
    fn deliver(&self, message: String) {
        if let Err(e) = self.try_deliver(message) {
            warn!("Message lost: {}", e);
        }
    }
}
