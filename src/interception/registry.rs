// src/interception/registry.rs
//! Hook registry
//!
//! Owns the installed-wrapper table. Installing a wrapper swaps it into
//! the located call site and remembers the original so it can be put
//! back. The table is only written during setup and teardown; calls
//! through installed wrappers never touch it.

use crate::interception::call_site::{CallSite, CallSiteLocator, Implementation};
use crate::interception::hook_point::{HookPoint, HookPointId, HookState};
use crate::utils::errors::AttachError;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An installed wrapper and what it replaced
struct Installation {
    site: Arc<dyn CallSite>,
    original: Implementation,
}

/// Outcome of attaching a list of hook points
#[derive(Debug, Default)]
pub struct AttachReport {
    /// Hook points now attached
    pub attached: Vec<HookPointId>,

    /// Hook points that failed to attach
    pub failed: Vec<(HookPointId, AttachError)>,
}

impl AttachReport {
    /// True when every hook point attached
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of installed wrappers
pub struct HookRegistry {
    locator: Arc<dyn CallSiteLocator>,
    installed: DashMap<HookPointId, Installation>,
}

impl HookRegistry {
    pub fn new(locator: Arc<dyn CallSiteLocator>) -> Self {
        Self {
            locator,
            installed: DashMap::new(),
        }
    }

    /// Install a wrapper at the hook point's call site
    ///
    /// `factory` receives the original implementation and returns the
    /// wrapper. Registering an attached point again replaces its wrapper;
    /// the new one still delegates to the original, never to the old
    /// wrapper.
    pub fn register<F>(&self, point: &HookPoint, factory: F) -> Result<(), AttachError>
    where
        F: FnOnce(Implementation) -> Implementation,
    {
        let id = point.id();
        let site = self.locator.locate(&point.container, &point.member)?;

        if let (Some(expected), Some(found)) = (point.arity, site.arity()) {
            if expected != found {
                return Err(AttachError::SignatureMismatch {
                    container: point.container.clone(),
                    member: point.member.clone(),
                    expected,
                    found,
                });
            }
        }

        let previous = self
            .installed
            .get(&id)
            .map(|entry| Arc::clone(&entry.original));
        let replacing = previous.is_some();
        let original = previous.unwrap_or_else(|| site.current());

        let wrapper = factory(Arc::clone(&original));
        site.replace(wrapper);

        self.installed.insert(id.clone(), Installation { site, original });

        if replacing {
            info!("Replaced hook at {}", id);
        } else {
            info!("Attached hook at {}", id);
        }
        Ok(())
    }

    /// Restore the original implementation; no-op when not attached
    pub fn unregister(&self, id: &HookPointId) -> bool {
        match self.installed.remove(id) {
            Some((_, installation)) => {
                installation.site.replace(installation.original);
                info!("Detached hook at {}", id);
                true
            }
            None => {
                debug!("Hook at {} not attached", id);
                false
            }
        }
    }

    /// Register every hook point independently
    ///
    /// A failure is reported once and does not stop the remaining points.
    pub fn register_all<F>(&self, points: &[HookPoint], mut factory: F) -> AttachReport
    where
        F: FnMut(&HookPoint, Implementation) -> Implementation,
    {
        let mut report = AttachReport::default();

        for point in points {
            match self.register(point, |original| factory(point, original)) {
                Ok(()) => report.attached.push(point.id()),
                Err(e) => {
                    warn!("Could not attach {}: {}", point.id(), e);
                    report.failed.push((point.id(), e));
                }
            }
        }

        report
    }

    /// Detach every installed hook
    pub fn unregister_all(&self) -> usize {
        let ids = self.attached();
        ids.iter().filter(|id| self.unregister(id)).count()
    }

    pub fn state(&self, id: &HookPointId) -> HookState {
        if self.installed.contains_key(id) {
            HookState::Attached
        } else {
            HookState::Detached
        }
    }

    /// Attached hook point ids, sorted
    pub fn attached(&self) -> Vec<HookPointId> {
        let mut ids: Vec<HookPointId> = self.installed.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::call_site::{implementation, MethodTable};
    use crate::interception::value::ArgValue;

    const CLASS: &str = "a.CloudUtil";

    fn table() -> Arc<MethodTable> {
        let table = Arc::new(MethodTable::new());
        table.define(CLASS, "encrypt", Some(2), implementation(|_| Ok(ArgValue::from("cipher"))));
        table
    }

    fn tagging(tag: &'static str) -> impl FnOnce(Implementation) -> Implementation {
        move |original| {
            implementation(move |args| {
                let inner = original(args)?;
                Ok(ArgValue::from(format!("{}({})", tag, inner.as_str().unwrap_or(""))))
            })
        }
    }

    fn call(table: &MethodTable) -> ArgValue {
        table.invoke(CLASS, "encrypt", &[]).unwrap().unwrap()
    }

    #[test]
    fn test_register_and_unregister() {
        let table = table();
        let registry = HookRegistry::new(table.clone());
        let point = HookPoint::request(CLASS, "encrypt", 0);

        assert_eq!(registry.state(&point.id()), HookState::Detached);
        registry.register(&point, tagging("w")).unwrap();
        assert_eq!(registry.state(&point.id()), HookState::Attached);
        assert_eq!(call(&table), ArgValue::from("w(cipher)"));

        assert!(registry.unregister(&point.id()));
        assert_eq!(registry.state(&point.id()), HookState::Detached);
        assert_eq!(call(&table), ArgValue::from("cipher"));

        // idempotent
        assert!(!registry.unregister(&point.id()));
        assert_eq!(call(&table), ArgValue::from("cipher"));
    }

    #[test]
    fn test_second_register_replaces() {
        let table = table();
        let registry = HookRegistry::new(table.clone());
        let point = HookPoint::request(CLASS, "encrypt", 0);

        registry.register(&point, tagging("a")).unwrap();
        registry.register(&point, tagging("b")).unwrap();

        assert_eq!(call(&table), ArgValue::from("b(cipher)"));
        assert_eq!(registry.len(), 1);

        registry.unregister(&point.id());
        assert_eq!(call(&table), ArgValue::from("cipher"));
    }

    #[test]
    fn test_missing_call_site() {
        let registry = HookRegistry::new(table());
        let point = HookPoint::request(CLASS, "renamed", 0);

        let err = registry.register(&point, tagging("w")).unwrap_err();
        assert!(matches!(err, AttachError::NotFound { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_arity_mismatch() {
        let table = table();
        let registry = HookRegistry::new(table.clone());
        let point = HookPoint::request(CLASS, "encrypt", 0).with_arity(5);

        let err = registry.register(&point, tagging("w")).unwrap_err();
        assert_eq!(
            err,
            AttachError::SignatureMismatch {
                container: CLASS.to_string(),
                member: "encrypt".to_string(),
                expected: 5,
                found: 2,
            }
        );
        assert_eq!(call(&table), ArgValue::from("cipher"));
    }

    #[test]
    fn test_register_all_is_independent() {
        let table = table();
        let registry = HookRegistry::new(table.clone());
        let points = vec![
            HookPoint::request(CLASS, "missing", 0),
            HookPoint::request(CLASS, "encrypt", 0),
        ];

        let report = registry.register_all(&points, |_, original| tagging("w")(original));

        assert!(!report.is_complete());
        assert_eq!(report.attached, vec![points[1].id()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, points[0].id());
        assert_eq!(call(&table), ArgValue::from("w(cipher)"));

        assert_eq!(registry.unregister_all(), 1);
        assert!(registry.is_empty());
        assert_eq!(call(&table), ArgValue::from("cipher"));
    }
}
