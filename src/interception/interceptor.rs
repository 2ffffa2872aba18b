// src/interception/interceptor.rs
//! Call interceptor
//!
//! Builds the wrapper installed at a call site. Every wrapper:
//!
//! - calls the original exactly once, with the arguments it received
//! - returns exactly what the original returned, failures included
//! - emits one event when the original succeeds, none when it fails
//!
//! Wrappers hold no mutable state. Concurrent calls on the same hook
//! point run independently on their callers' threads.

use crate::interception::call_site::{implementation, CallResult, Implementation};
use crate::interception::correlator::{CapturedCall, Correlator};
use crate::interception::emitter::Emitter;
use crate::interception::hook_point::{CaptureShape, HookPoint};
use crate::interception::value::ArgValue;
use std::sync::Arc;

/// Produces transparent wrappers that observe calls
#[derive(Clone)]
pub struct CallInterceptor {
    emitter: Emitter,
}

impl CallInterceptor {
    pub fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }

    /// Wrap `original` for `point`
    pub fn wrap(&self, point: Arc<HookPoint>, original: Implementation) -> Implementation {
        let emitter = self.emitter.clone();
        let capture = point.capture;

        match capture {
            CaptureShape::Pre => implementation(move |args| {
                pre_capture(&point, &original, &emitter, args)
            }),
            CaptureShape::Post { context_from } => implementation(move |args| {
                post_capture(&point, &original, &emitter, args, context_from)
            }),
        }
    }
}

/// Observe the inputs, then delegate
///
/// The event is built before delegating so it reflects the arguments as
/// the caller passed them, and is only emitted once the original returns.
fn pre_capture(
    point: &HookPoint,
    original: &Implementation,
    emitter: &Emitter,
    args: &[ArgValue],
) -> CallResult {
    let event = Correlator::new(point).observe(&CapturedCall::pre(args));

    let result = original(args);

    if result.is_ok() {
        emitter.emit(&event);
    }
    result
}

/// Delegate, then observe the return value with its correlation context
fn post_capture(
    point: &HookPoint,
    original: &Implementation,
    emitter: &Emitter,
    args: &[ArgValue],
    context_from: usize,
) -> CallResult {
    let result = original(args);

    if let Ok(ret) = &result {
        let event = Correlator::new(point).observe(&CapturedCall::post(args, ret, context_from));
        emitter.emit(&event);
    }
    result
}
