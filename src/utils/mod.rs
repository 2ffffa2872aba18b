// src/utils/mod.rs
//! Common utilities: error types and configuration loading

pub mod config;
pub mod errors;

pub use config::{EngineConfig, LoggingConfig, ObserverConfig};
pub use errors::{AttachError, EngineError, ExtractionError, Result, TransportError};
