// src/observer/flow_correlator.rs
//! Pairs request and response events into flows
//!
//! Requests and responses arrive at unrelated times; the nonce is the
//! only thing linking them. Completed flows are dispatched to the handler
//! registered for their route and method.

use crate::interception::emitter::ObservedEvent;
use crate::interception::hook_point::EventKind;
use crate::observer::flow::HttpFlow;
use crate::utils::errors::{EngineError, Result};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Method pattern matching any method of a route
pub const ALL_METHODS: &str = "*";

/// Receives completed flows
pub trait FlowHandler: Send + Sync {
    fn handle(&self, flow: &HttpFlow);
}

impl<F> FlowHandler for F
where
    F: Fn(&HttpFlow) + Send + Sync,
{
    fn handle(&self, flow: &HttpFlow) {
        self(flow)
    }
}

/// Reassembles flows from a stream of wire messages
#[derive(Default)]
pub struct FlowCorrelator {
    /// route -> method pattern -> handler
    handlers: HashMap<String, HashMap<String, Box<dyn FlowHandler>>>,

    /// Requests waiting for their response, by nonce
    pending: HashMap<String, HttpFlow>,

    /// Log every completed flow
    verbose: bool,
}

impl FlowCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Register a handler for a route, for one method or `ALL_METHODS`
    pub fn on<H>(&mut self, route: impl Into<String>, method: impl Into<String>, handler: H)
    where
        H: FlowHandler + 'static,
    {
        let route = route.into();
        let method = method.into();
        debug!("Registering flow handler for {} {}", method, route);
        self.handlers
            .entry(route)
            .or_default()
            .insert(method, Box::new(handler));
    }

    /// Register a handler for every method of a route
    pub fn on_route<H>(&mut self, route: impl Into<String>, handler: H)
    where
        H: FlowHandler + 'static,
    {
        self.on(route, ALL_METHODS, handler);
    }

    /// Decode and process one wire message
    ///
    /// Returns the flow a response completed, if any.
    pub fn handle_message(&mut self, message: &str) -> Result<Option<HttpFlow>> {
        let event = ObservedEvent::from_message(message)
            .map_err(|e| EngineError::MalformedMessage(e.to_string()))?;
        Ok(self.handle_event(event))
    }

    /// Process one decoded event
    pub fn handle_event(&mut self, event: ObservedEvent) -> Option<HttpFlow> {
        if event.correlation_key.is_empty() {
            warn!(kind = %event.kind, "Event without nonce cannot be correlated");
            return None;
        }

        match event.kind {
            EventKind::Request => {
                self.open_flow(event);
                None
            }
            EventKind::Response => self.complete_flow(event),
        }
    }

    /// Number of requests still waiting for a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn open_flow(&mut self, mut event: ObservedEvent) {
        let nonce = event.correlation_key.to_string();
        let ssecurity = event.fields.remove("ssecurity");
        let mut take = |name: &str| event.fields.remove(name).unwrap_or_default();

        let flow = HttpFlow {
            nonce: nonce.clone(),
            method: take("method"),
            route: take("route"),
            req_body: take("body"),
            ssecurity,
            res_body: String::new(),
            requested_at: Utc::now(),
            completed_at: None,
        };

        if self.pending.insert(nonce.clone(), flow).is_some() {
            debug!("Request {} replaced a pending request with the same nonce", nonce);
        }
    }

    fn complete_flow(&mut self, mut event: ObservedEvent) -> Option<HttpFlow> {
        let nonce = event.correlation_key.as_str();

        let Some(mut flow) = self.pending.remove(nonce) else {
            warn!("{} doesn't exist!", nonce);
            return None;
        };

        flow.res_body = event.fields.remove("body").unwrap_or_default();
        if flow.ssecurity.is_none() {
            flow.ssecurity = event.fields.remove("ssecurity");
        }
        flow.completed_at = Some(Utc::now());

        if self.verbose {
            info!(
                nonce = %flow.nonce,
                method = %flow.method,
                route = %flow.route,
                "Flow completed: {:?}",
                flow
            );
        }

        if let Some(handler) = self.handler_for(&flow.route, &flow.method) {
            handler.handle(&flow);
        }

        Some(flow)
    }

    fn handler_for(&self, route: &str, method: &str) -> Option<&dyn FlowHandler> {
        let by_method = self.handlers.get(route)?;
        by_method
            .get(method)
            .or_else(|| by_method.get(ALL_METHODS))
            .map(|handler| handler.as_ref())
    }
}
