// src/transport/mod.rs
//! Outbound transports
//!
//! A transport delivers one text message across the process boundary.
//! The engine observes no return value and assumes no delivery guarantee:
//!
//! - **ChannelTransport**: hands messages to a receiver thread over a channel
//! - **WriterTransport**: writes newline-delimited messages to any `Write`
//! - **MemoryTransport**: keeps messages in memory, in delivery order

pub mod channel;
pub mod memory;
pub mod writer;

pub use channel::ChannelTransport;
pub use memory::MemoryTransport;
pub use writer::WriterTransport;

/// Deliver one text message
///
/// Implementations handle their own failures; nothing is reported back.
pub trait Transport: Send + Sync {
    fn deliver(&self, message: String);
}
