// src/utils/config.rs
//! Layered configuration for the driving tools
//!
//! The interception core reads no configuration of its own. This is
//! consumed by the observer binary: defaults, then an optional file, then
//! `CALLTAP_`-prefixed environment variables (`__` between sections, e.g.
//! `CALLTAP_OBSERVER__VERBOSE=true`).

use crate::interception::plan::HookPlan;
use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Hook plan file (YAML); the built-in plan is used when absent
    #[serde(default)]
    pub plan_path: Option<PathBuf>,

    /// Observer configuration
    #[serde(default)]
    pub observer: ObserverConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit log lines as JSON
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Observer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Log every completed flow
    #[serde(default)]
    pub verbose: bool,

    /// Only print flows for these routes (all routes when empty)
    #[serde(default)]
    pub watch_routes: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration from defaults and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an optional file between defaults and environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CALLTAP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("observer.watch_routes")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Hook plan named by `plan_path`, or the built-in plan
    pub fn plan(&self) -> Result<HookPlan> {
        match &self.plan_path {
            Some(path) => HookPlan::from_path(path),
            None => Ok(HookPlan::cloud_util()),
        }
    }
}
