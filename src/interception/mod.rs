// src/interception/mod.rs
//! Call-site interception and correlation
//!
//! This module observes plaintext on both sides of an opaque transform
//! without changing what the target sees:
//!
//! - **Hook Registry**: installs and restores wrappers at named call sites
//! - **Call Interceptor**: the wrapper, delegating to the original exactly once
//! - **Correlator**: extracts the correlation key and fields of a call
//! - **Emitter**: serializes events to the transport
//! - **Plan / Session**: declarative hook lists and their attach/detach cycle
//!
//! # Architecture
//!
//! ```text
//! Target call
//!     │
//!     ├─ Call Interceptor (capture in) ─┐
//!     │                                 │
//!     ├─ original implementation        │
//!     │                                 │
//!     └─ Call Interceptor (capture out) ┴─ Correlator → Emitter → Transport
//! ```

pub mod call_site;
pub mod correlator;
pub mod emitter;
pub mod hook_point;
pub mod interceptor;
pub mod plan;
pub mod registry;
pub mod session;
pub mod value;

// Re-export commonly used types
pub use call_site::{
    implementation, CallFailure, CallResult, CallSite, CallSiteLocator, Implementation,
    MethodSlot, MethodTable,
};
pub use correlator::{CapturedCall, CorrelationKey, Correlator};
pub use emitter::{Emitter, ObservedEvent};
pub use hook_point::{CaptureShape, EventKind, FieldSpec, HookPoint, HookPointId, HookState};
pub use interceptor::CallInterceptor;
pub use plan::{HookPlan, CLOUD_UTIL_CLASS};
pub use registry::{AttachReport, HookRegistry};
pub use session::InterceptionSession;
pub use value::ArgValue;
