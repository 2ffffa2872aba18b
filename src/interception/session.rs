// src/interception/session.rs
//! Interception session
//!
//! Composes the registry, interceptor and emitter for one attach/detach
//! cycle. `attach` returns only after every hook that can be installed
//! is installed; dropping the session detaches whatever is left.

use crate::interception::call_site::CallSiteLocator;
use crate::interception::emitter::Emitter;
use crate::interception::hook_point::{HookPointId, HookState};
use crate::interception::interceptor::CallInterceptor;
use crate::interception::plan::HookPlan;
use crate::interception::registry::{AttachReport, HookRegistry};
use crate::transport::Transport;
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::{info, warn};
use ulid::Ulid;

/// One attach/detach cycle against a target
pub struct InterceptionSession {
    id: Ulid,
    registry: HookRegistry,
    interceptor: CallInterceptor,
}

impl InterceptionSession {
    pub fn new(locator: Arc<dyn CallSiteLocator>, transport: Arc<dyn Transport>) -> Self {
        let id = Ulid::new();
        info!(session = %id, "Creating interception session");

        Self {
            id,
            registry: HookRegistry::new(locator),
            interceptor: CallInterceptor::new(Emitter::new(transport)),
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Validate the plan and attach each of its hook points
    ///
    /// An invalid plan attaches nothing. Individual attach failures are
    /// reported in the returned `AttachReport` and do not stop the rest.
    pub fn attach(&self, plan: &HookPlan) -> Result<AttachReport> {
        plan.validate()?;

        let interceptor = &self.interceptor;
        let report = self.registry.register_all(&plan.points, |point, original| {
            interceptor.wrap(Arc::new(point.clone()), original)
        });

        if report.is_complete() {
            info!(session = %self.id, "Attached {} hooks", report.attached.len());
        } else {
            warn!(
                session = %self.id,
                "Attached {} of {} hooks",
                report.attached.len(),
                plan.points.len()
            );
        }

        Ok(report)
    }

    /// Detach every hook; safe to call repeatedly
    pub fn detach(&self) -> usize {
        let detached = self.registry.unregister_all();
        if detached > 0 {
            info!(session = %self.id, "Detached {} hooks", detached);
        }
        detached
    }

    pub fn state(&self, id: &HookPointId) -> HookState {
        self.registry.state(id)
    }

    pub fn attached(&self) -> Vec<HookPointId> {
        self.registry.attached()
    }
}

impl Drop for InterceptionSession {
    fn drop(&mut self) {
        self.detach();
    }
}
