// src/interception/emitter.rs
//! Observed events and their emission
//!
//! An `ObservedEvent` serializes to one flat JSON object:
//! `{"nonce": ..., "type": ..., <field>: <string>, ...}`. Emission is
//! fire-and-forget; nothing the transport does flows back into the call.

use crate::interception::correlator::CorrelationKey;
use crate::interception::hook_point::EventKind;
use crate::transport::Transport;
use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, trace, warn};

/// The unit delivered to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Correlation key, possibly empty
    #[serde(rename = "nonce")]
    pub correlation_key: CorrelationKey,

    /// Event kind
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Extracted fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl ObservedEvent {
    pub fn new(correlation_key: CorrelationKey, kind: EventKind) -> Self {
        Self {
            correlation_key,
            kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Serialize to one self-contained wire message
    pub fn to_message(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one wire message
    pub fn from_message(message: &str) -> Result<Self> {
        Ok(serde_json::from_str(message)?)
    }
}

/// Hands events to a transport
#[derive(Clone)]
pub struct Emitter {
    transport: Arc<dyn Transport>,
}

impl Emitter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Serialize and deliver an event
    ///
    /// Never fails and never unwinds into the caller: serialization
    /// errors and transport panics are logged and the event is lost.
    pub fn emit(&self, event: &ObservedEvent) {
        let message = match event.to_message() {
            Ok(message) => message,
            Err(e) => {
                warn!(kind = %event.kind, "Dropping event that failed to serialize: {}", e);
                return;
            }
        };

        trace!(kind = %event.kind, nonce = %event.correlation_key, "Emitting event");

        let transport = &self.transport;
        if panic::catch_unwind(AssertUnwindSafe(|| transport.deliver(message))).is_err() {
            error!(kind = %event.kind, "Transport panicked while delivering event");
        }
    }
}
