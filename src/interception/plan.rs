// src/interception/plan.rs
//! Declarative hook plans
//!
//! A plan is the fixed list of hook points a session attaches. Plans are
//! written in YAML or taken from the built-in `cloud_util` plan, which
//! targets the request/response crypto helper of the observed app.

use crate::interception::hook_point::{FieldSpec, HookPoint};
use crate::utils::errors::{EngineError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Container holding the observed crypto helper
pub const CLOUD_UTIL_CLASS: &str = "com.xiaomi.common.crypt.CloudUtil";

static CLOUD_UTIL_PLAN: Lazy<HookPlan> = Lazy::new(|| {
    // encryptParams(method, route, params, nonce, ssecurity)
    let encrypt = |member: &str| {
        HookPoint::request(CLOUD_UTIL_CLASS, member, 3)
            .with_field(FieldSpec::new(0, "method"))
            .with_field(FieldSpec::new(1, "route"))
            .with_field(FieldSpec::new(2, "body").with_key("data"))
            .with_field(FieldSpec::new(4, "ssecurity"))
    };

    // decryptResponse(content, nonce, ssecurity) -> plaintext
    let decrypt = HookPoint::response(CLOUD_UTIL_CLASS, "decryptResponse", 1, 1)
        .with_field(FieldSpec::new(0, "body"))
        .with_field(FieldSpec::new(2, "ssecurity"));

    HookPlan {
        points: vec![encrypt("encryptParams"), encrypt("encryptParams2"), decrypt],
    }
});

/// The hook points a session attaches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPlan {
    pub points: Vec<HookPoint>,
}

impl HookPlan {
    pub fn new(points: Vec<HookPoint>) -> Self {
        Self { points }
    }

    /// Built-in plan for the CloudUtil crypto helper
    pub fn cloud_util() -> Self {
        CLOUD_UTIL_PLAN.clone()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let plan: HookPlan = serde_yaml::from_str(yaml)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading hook plan from {:?}", path);
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject plans that could never produce well-formed events
    pub fn validate(&self) -> Result<()> {
        let mut ids = Vec::with_capacity(self.points.len());

        for point in &self.points {
            point.validate().map_err(EngineError::Plan)?;

            let id = point.id();
            if ids.contains(&id) {
                return Err(EngineError::Plan(format!("{} listed twice", id)));
            }
            ids.push(id);
        }

        Ok(())
    }
}
