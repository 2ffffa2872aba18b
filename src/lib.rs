// src/lib.rs
//! Calltap Engine Library
//!
//! Observes the plaintext going into and coming out of an opaque
//! request/response crypto transform inside a running process, and
//! streams it out as self-describing events keyed by the call's nonce.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **interception**: hook registry, call interceptor, correlator and emitter
//! - **transport**: outbound delivery of event messages
//! - **observer**: consumer side, pairing events back into request/response flows
//! - **observability**: logging setup
//! - **utils**: errors and configuration

// Public module exports
pub mod interception;
pub mod observability;
pub mod observer;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use interception::{
    ArgValue, CallFailure, CallSiteLocator, EventKind, HookPlan, HookPoint, InterceptionSession,
    MethodTable, ObservedEvent,
};
pub use observer::{FlowCorrelator, HttpFlow};
pub use transport::Transport;
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Engine build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}
