// src/interception/hook_point.rs
//! Hook point definitions
//!
//! A `HookPoint` names one instrumentable call site and statically
//! describes what an interception there observes: which way the call is
//! captured, which position holds the correlation key, and which
//! positions become event fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field names that the wire schema reserves for itself
pub const RESERVED_FIELDS: [&str; 2] = ["nonce", "type"];

/// Kind of an observed event, fixed per hook point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A request being prepared (plaintext inputs to the transform)
    Request,

    /// A response being consumed (plaintext output of the transform)
    Response,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Request => "request",
            EventKind::Response => "response",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an interception observes its call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CaptureShape {
    /// Observe the arguments as passed
    Pre,

    /// Observe the return value; position 0 is the return value and
    /// positions 1.. are the arguments starting at `context_from`
    Post {
        #[serde(default)]
        context_from: usize,
    },
}

/// One (position -> field name) mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Position in the observed view
    pub position: usize,

    /// Field name in the emitted event
    pub name: String,

    /// Read this entry from a map value instead of the value itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl FieldSpec {
    pub fn new(position: usize, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// An instrumentable call site and what to observe there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPoint {
    /// Fully qualified container (class) name
    pub container: String,

    /// Member (method) name
    pub member: String,

    /// Expected argument count, checked against the located call site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,

    /// Event kind every interception here produces
    pub kind: EventKind,

    /// Capture shape
    pub capture: CaptureShape,

    /// Position of the correlation key in the observed view
    pub key_position: usize,

    /// Extracted fields
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl HookPoint {
    /// Pre-capture hook point with no fields
    pub fn request(
        container: impl Into<String>,
        member: impl Into<String>,
        key_position: usize,
    ) -> Self {
        Self {
            container: container.into(),
            member: member.into(),
            arity: None,
            kind: EventKind::Request,
            capture: CaptureShape::Pre,
            key_position,
            fields: Vec::new(),
        }
    }

    /// Post-capture hook point with no fields
    pub fn response(
        container: impl Into<String>,
        member: impl Into<String>,
        context_from: usize,
        key_position: usize,
    ) -> Self {
        Self {
            container: container.into(),
            member: member.into(),
            arity: None,
            kind: EventKind::Response,
            capture: CaptureShape::Post { context_from },
            key_position,
            fields: Vec::new(),
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Registry key, `container::member`
    pub fn id(&self) -> HookPointId {
        HookPointId(format!("{}::{}", self.container, self.member))
    }

    /// Check the static description before anything is attached
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.container.is_empty() || self.member.is_empty() {
            return Err("container and member must be non-empty".to_string());
        }

        for field in &self.fields {
            if RESERVED_FIELDS.contains(&field.name.as_str()) {
                return Err(format!(
                    "{}: field name '{}' is reserved",
                    self.id(),
                    field.name
                ));
            }
            if field.name.is_empty() {
                return Err(format!("{}: empty field name", self.id()));
            }
        }

        let mut names: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("{}: duplicate field '{}'", self.id(), dup[0]));
        }

        Ok(())
    }
}

/// Identity of a hook point within a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HookPointId(pub String);

impl fmt::Display for HookPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Installation state of a hook point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Detached,
    Attached,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encrypt_point() -> HookPoint {
        HookPoint::request("a.CloudUtil", "encryptParams", 3)
            .with_field(FieldSpec::new(0, "method"))
            .with_field(FieldSpec::new(2, "body").with_key("data"))
    }

    #[test]
    fn test_id() {
        assert_eq!(encrypt_point().id().to_string(), "a.CloudUtil::encryptParams");
    }

    #[test]
    fn test_validate_ok() {
        assert!(encrypt_point().validate().is_ok());
    }

    #[test]
    fn test_reserved_field_rejected() {
        let point = encrypt_point().with_field(FieldSpec::new(3, "nonce"));
        let err = point.validate().unwrap_err();
        assert!(err.contains("reserved"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let point = encrypt_point().with_field(FieldSpec::new(1, "method"));
        let err = point.validate().unwrap_err();
        assert!(err.contains("duplicate field 'method'"));
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(EventKind::Request.as_str(), "request");
        assert_eq!(
            serde_json::to_string(&EventKind::Response).unwrap(),
            "\"response\""
        );
    }

    #[test]
    fn test_capture_shape_yaml() {
        let shape: CaptureShape = serde_yaml::from_str("shape: post\ncontext_from: 1\n").unwrap();
        assert_eq!(shape, CaptureShape::Post { context_from: 1 });

        let shape: CaptureShape = serde_yaml::from_str("shape: pre\n").unwrap();
        assert_eq!(shape, CaptureShape::Pre);
    }
}
