// src/transport/memory.rs
//! In-memory collecting transport

use crate::transport::Transport;
use parking_lot::Mutex;

/// Collects delivered messages in order
#[derive(Debug, Default)]
pub struct MemoryTransport {
    messages: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Remove and return everything delivered so far
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Transport for MemoryTransport {
    fn deliver(&self, message: String) {
        self.messages.lock().push(message);
    }
}
