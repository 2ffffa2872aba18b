// src/interception/correlator.rs
//! Correlation key and field extraction
//!
//! Turns one captured call into an `ObservedEvent`. Extraction is
//! shape-tolerant: a missing or oddly shaped value drops only the field
//! it was meant to fill, and a missing key yields an empty key rather
//! than a dropped event.

use crate::interception::emitter::ObservedEvent;
use crate::interception::hook_point::{EventKind, FieldSpec, HookPoint};
use crate::interception::value::ArgValue;
use crate::utils::errors::ExtractionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// Opaque key pairing a request with its response
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One observed invocation, borrowed for the duration of an interception
///
/// Positions are resolved against the observed view: the arguments for a
/// pre-capture, or `[return value, args[context_from..]]` for a
/// post-capture.
#[derive(Debug, Clone, Copy)]
pub struct CapturedCall<'a> {
    args: &'a [ArgValue],
    return_value: Option<&'a ArgValue>,
    context_from: usize,
}

impl<'a> CapturedCall<'a> {
    /// Arguments observed before delegating
    pub fn pre(args: &'a [ArgValue]) -> Self {
        Self {
            args,
            return_value: None,
            context_from: 0,
        }
    }

    /// Return value observed after delegating, with its correlation context
    pub fn post(args: &'a [ArgValue], return_value: &'a ArgValue, context_from: usize) -> Self {
        Self {
            args,
            return_value: Some(return_value),
            context_from,
        }
    }

    pub fn args(&self) -> &'a [ArgValue] {
        self.args
    }

    pub fn return_value(&self) -> Option<&'a ArgValue> {
        self.return_value
    }

    /// Value at a position of the observed view
    pub fn arg(&self, position: usize) -> Option<&'a ArgValue> {
        match self.return_value {
            None => self.args.get(position),
            Some(ret) if position == 0 => Some(ret),
            Some(_) => self
                .context_from
                .checked_add(position - 1)
                .and_then(|index| self.args.get(index)),
        }
    }
}

/// Extraction rules of one hook point
pub struct Correlator<'p> {
    point: &'p HookPoint,
}

impl<'p> Correlator<'p> {
    pub fn new(point: &'p HookPoint) -> Self {
        Self { point }
    }

    /// Event kind; fixed per hook point, never read from call content
    pub fn classify(&self, _call: &CapturedCall<'_>) -> EventKind {
        self.point.kind
    }

    /// Correlation key, empty when it cannot be read
    pub fn extract_correlation_key(&self, call: &CapturedCall<'_>) -> CorrelationKey {
        match read_text(call, self.point.key_position, None) {
            Ok(key) => CorrelationKey(key),
            Err(e) => {
                trace!(hook = %self.point.id(), "Correlation key unavailable: {}", e);
                CorrelationKey::default()
            }
        }
    }

    /// Readable fields; unreadable ones are omitted
    pub fn extract_fields(&self, call: &CapturedCall<'_>) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();

        for field in &self.point.fields {
            match extract_field(call, field) {
                Ok(value) => {
                    fields.insert(field.name.clone(), value);
                }
                Err(e) => {
                    trace!(hook = %self.point.id(), field = %field.name, "Field omitted: {}", e);
                }
            }
        }

        fields
    }

    /// Build the event for a captured call
    pub fn observe(&self, call: &CapturedCall<'_>) -> ObservedEvent {
        ObservedEvent {
            correlation_key: self.extract_correlation_key(call),
            kind: self.classify(call),
            fields: self.extract_fields(call),
        }
    }
}

/// Read one field as text
pub fn extract_field(call: &CapturedCall<'_>, field: &FieldSpec) -> Result<String, ExtractionError> {
    read_text(call, field.position, field.key.as_deref())
}

fn read_text(
    call: &CapturedCall<'_>,
    position: usize,
    key: Option<&str>,
) -> Result<String, ExtractionError> {
    let value = call
        .arg(position)
        .filter(|v| !v.is_null())
        .ok_or(ExtractionError::Missing { position })?;

    let value = match key {
        Some(key) => {
            let map = value.as_map().ok_or(ExtractionError::NotAMap { position })?;
            map.get(key).ok_or_else(|| ExtractionError::MissingKey {
                position,
                key: key.to_string(),
            })?
        }
        None => value,
    };

    value
        .to_text()
        .ok_or(ExtractionError::Unreadable { position })
}
