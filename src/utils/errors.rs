// src/utils/errors.rs
//! Error taxonomy for the engine
//!
//! Only `AttachError` and the observer/config errors ever reach a caller.
//! `ExtractionError` and `TransportError` are soft: they are logged where
//! they happen and degrade an event instead of failing a call.

use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Attach failed: {0}")]
    Attach(#[from] AttachError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid hook plan: {0}")]
    Plan(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

/// A configured call site could not be located or installed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("call site {container}::{member} not found")]
    NotFound { container: String, member: String },

    #[error("call site {container}::{member} takes {found} arguments, expected {expected}")]
    SignatureMismatch {
        container: String,
        member: String,
        expected: usize,
        found: usize,
    },
}

/// A single field or the correlation key could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no value at position {position}")]
    Missing { position: usize },

    #[error("value at position {position} is not a map")]
    NotAMap { position: usize },

    #[error("map at position {position} has no entry '{key}'")]
    MissingKey { position: usize, key: String },

    #[error("value at position {position} has no textual form")]
    Unreadable { position: usize },
}

/// Delivery of a message to the transport failed
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("transport receiver disconnected")]
    Disconnected,

    #[error("transport write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
