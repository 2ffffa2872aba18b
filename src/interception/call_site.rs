// src/interception/call_site.rs
//! Call sites and the dispatch indirection they are reached through
//!
//! The engine never patches foreign code. A call site is a slot holding
//! the implementation currently answering calls; attaching swaps the slot
//! contents and detaching swaps the original back. How a slot is found
//! in a target is the job of a `CallSiteLocator`, which is injected so the
//! core stays independent of any introspection mechanism.
//!
//! `MethodTable` is the in-process locator: a named table of slots that a
//! host routes its calls through.

use crate::interception::value::ArgValue;
use crate::utils::errors::AttachError;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A failure raised by the target's own implementation
///
/// The engine only ever passes these through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{class}: {message}")]
pub struct CallFailure {
    /// Failure type as named by the target
    pub class: String,

    /// Failure message
    pub message: String,
}

impl CallFailure {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one call through a call site
pub type CallResult = std::result::Result<ArgValue, CallFailure>;

/// Handle to an implementation answering calls at a call site
pub type Implementation = Arc<dyn Fn(&[ArgValue]) -> CallResult + Send + Sync>;

/// Wrap a closure as an `Implementation`
pub fn implementation<F>(f: F) -> Implementation
where
    F: Fn(&[ArgValue]) -> CallResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A live, replaceable call site
pub trait CallSite: Send + Sync {
    /// Argument count of the member, if the target can tell
    fn arity(&self) -> Option<usize> {
        None
    }

    /// Implementation currently installed
    fn current(&self) -> Implementation;

    /// Install `implementation`, returning the one it replaced
    fn replace(&self, implementation: Implementation) -> Implementation;
}

/// Finds call sites by (container, member) name
pub trait CallSiteLocator: Send + Sync {
    fn locate(&self, container: &str, member: &str) -> Result<Arc<dyn CallSite>, AttachError>;
}

/// One slot of a `MethodTable`
pub struct MethodSlot {
    arity: Option<usize>,
    implementation: RwLock<Implementation>,
}

impl MethodSlot {
    pub fn new(arity: Option<usize>, implementation: Implementation) -> Self {
        Self {
            arity,
            implementation: RwLock::new(implementation),
        }
    }

    /// Dispatch a call to whatever is installed
    ///
    /// The slot lock is released before the call runs, so implementations
    /// may re-enter this slot or any other.
    pub fn invoke(&self, args: &[ArgValue]) -> CallResult {
        let implementation = self.implementation.read().clone();
        implementation(args)
    }
}

impl CallSite for MethodSlot {
    fn arity(&self) -> Option<usize> {
        self.arity
    }

    fn current(&self) -> Implementation {
        self.implementation.read().clone()
    }

    fn replace(&self, implementation: Implementation) -> Implementation {
        std::mem::replace(&mut *self.implementation.write(), implementation)
    }
}

impl fmt::Debug for MethodSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSlot")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// In-process dispatch table of named call sites
#[derive(Default)]
pub struct MethodTable {
    slots: DashMap<String, Arc<MethodSlot>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a member with its original implementation
    pub fn define(
        &self,
        container: &str,
        member: &str,
        arity: Option<usize>,
        implementation: Implementation,
    ) -> Arc<MethodSlot> {
        let slot = Arc::new(MethodSlot::new(arity, implementation));
        debug!("Defining call site {}::{}", container, member);
        self.slots
            .insert(slot_key(container, member), Arc::clone(&slot));
        slot
    }

    /// Slot for a member, if defined
    pub fn slot(&self, container: &str, member: &str) -> Option<Arc<MethodSlot>> {
        self.slots
            .get(&slot_key(container, member))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Call a member through its slot
    pub fn invoke(&self, container: &str, member: &str, args: &[ArgValue]) -> Option<CallResult> {
        let slot = self.slot(container, member)?;
        Some(slot.invoke(args))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl CallSiteLocator for MethodTable {
    fn locate(&self, container: &str, member: &str) -> Result<Arc<dyn CallSite>, AttachError> {
        self.slot(container, member)
            .map(|slot| slot as Arc<dyn CallSite>)
            .ok_or_else(|| AttachError::NotFound {
                container: container.to_string(),
                member: member.to_string(),
            })
    }
}

fn slot_key(container: &str, member: &str) -> String {
    format!("{}::{}", container, member)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Implementation {
        implementation(|args| Ok(args.first().cloned().unwrap_or(ArgValue::Null)))
    }

    #[test]
    fn test_define_and_invoke() {
        let table = MethodTable::new();
        table.define("a.B", "echo", Some(1), echo());

        let result = table.invoke("a.B", "echo", &["hi".into()]).unwrap();
        assert_eq!(result.unwrap(), ArgValue::from("hi"));
        assert!(table.invoke("a.B", "missing", &[]).is_none());
    }

    #[test]
    fn test_locate_missing() {
        let table = MethodTable::new();
        let err = table.locate("a.B", "gone").err().unwrap();
        assert_eq!(
            err,
            AttachError::NotFound {
                container: "a.B".to_string(),
                member: "gone".to_string()
            }
        );
    }

    #[test]
    fn test_replace_returns_previous() {
        let table = MethodTable::new();
        let slot = table.define("a.B", "echo", None, echo());

        let previous = slot.replace(implementation(|_| Ok(ArgValue::Int(7))));
        assert_eq!(slot.invoke(&[]).unwrap(), ArgValue::Int(7));
        assert_eq!(previous(&[ArgValue::from("x")]).unwrap(), ArgValue::from("x"));

        slot.replace(previous);
        assert_eq!(slot.invoke(&["y".into()]).unwrap(), ArgValue::from("y"));
    }

    #[test]
    fn test_reentrant_invoke() {
        let table = Arc::new(MethodTable::new());
        table.define("a.B", "leaf", None, implementation(|_| Ok(ArgValue::Int(1))));

        let inner = Arc::clone(&table);
        table.define(
            "a.B",
            "outer",
            None,
            implementation(move |args| inner.invoke("a.B", "leaf", args).unwrap()),
        );

        assert_eq!(table.invoke("a.B", "outer", &[]).unwrap().unwrap(), ArgValue::Int(1));
    }

    #[test]
    fn test_failure_passthrough() {
        let table = MethodTable::new();
        table.define(
            "a.B",
            "fail",
            None,
            implementation(|_| Err(CallFailure::new("IllegalStateException", "boom"))),
        );

        let err = table.invoke("a.B", "fail", &[]).unwrap().unwrap_err();
        assert_eq!(err.to_string(), "IllegalStateException: boom");
    }
}
