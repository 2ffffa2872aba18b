// src/observer/mod.rs
//! Consumer side of the event stream
//!
//! Turns the wire messages emitted by an interception session back into
//! request/response flows:
//!
//! - **HttpFlow**: one exchange, paired by nonce
//! - **FlowCorrelator**: pending-request table and route handlers

pub mod flow;
pub mod flow_correlator;

pub use flow::HttpFlow;
pub use flow_correlator::{FlowCorrelator, FlowHandler, ALL_METHODS};
