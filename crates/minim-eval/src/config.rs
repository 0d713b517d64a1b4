//! # Engine Configuration
//!
//! `EvalConfig` is read from TOML and may be overridden from the environment:
//!
//! - `MINIM_WORKERS`: concurrent requirement evaluations (default: 8)
//! - `MINIM_PROBE_TIMEOUT_MS`: per-probe timeout (default: 5000)
//! - `MINIM_COMMAND_TIMEOUT_MS`: per-command timeout (default: 10000)
//! - `MINIM_EVALUATION_TIMEOUT_MS`: whole-evaluation timeout (default: 60000)
//! - `MINIM_LIVENESS_CACHE`: cache probe results by URI (default: true)
//! - `MINIM_ALLOW_COMMANDS`: let Command rules run programs (default: false)
//!
//! Unparseable environment values are logged and ignored.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Runtime settings of the evaluation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub workers: usize,
    pub probe_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub evaluation_timeout_ms: u64,
    pub liveness_cache: bool,
    pub liveness_cache_capacity: u64,
    pub allow_commands: bool,
    pub user_agent: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            probe_timeout_ms: 5_000,
            command_timeout_ms: 10_000,
            evaluation_timeout_ms: 60_000,
            liveness_cache: true,
            liveness_cache_capacity: 10_000,
            allow_commands: false,
            user_agent: concat!("minim/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl EvalConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EvalConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load, validate and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `MINIM_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = parsed(&lookup, "MINIM_WORKERS", |s| s.parse().ok()) {
            self.workers = value;
        }
        if let Some(value) = parsed(&lookup, "MINIM_PROBE_TIMEOUT_MS", |s| s.parse().ok()) {
            self.probe_timeout_ms = value;
        }
        if let Some(value) = parsed(&lookup, "MINIM_COMMAND_TIMEOUT_MS", |s| s.parse().ok()) {
            self.command_timeout_ms = value;
        }
        if let Some(value) = parsed(&lookup, "MINIM_EVALUATION_TIMEOUT_MS", |s| s.parse().ok()) {
            self.evaluation_timeout_ms = value;
        }
        if let Some(value) = parsed(&lookup, "MINIM_LIVENESS_CACHE", parse_bool) {
            self.liveness_cache = value;
        }
        if let Some(value) = parsed(&lookup, "MINIM_ALLOW_COMMANDS", parse_bool) {
            self.allow_commands = value;
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.workers > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid(format!(
                "workers must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        for (name, value) in [
            ("probe_timeout_ms", self.probe_timeout_ms),
            ("command_timeout_ms", self.command_timeout_ms),
            ("evaluation_timeout_ms", self.evaluation_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    /// Worker permits for the evaluation pool, kept within `1..=MAX_PERMITS`
    /// for configs that bypassed [`EvalConfig::validate`].
    #[must_use]
    pub fn worker_permits(&self) -> usize {
        self.workers.clamp(1, Semaphore::MAX_PERMITS)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    #[must_use]
    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluation_timeout_ms)
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(name)?;
    let value = parse(raw.trim());
    if value.is_none() {
        tracing::warn!(variable = name, value = %raw, "ignoring unparseable override");
    }
    value
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
