//! # Engine Errors
//!
//! Only [`EvaluationError`] escapes `Evaluator::evaluate`. Every other kind is
//! recovered inside the engine: rule errors become FAIL outcomes, liveness
//! errors become "not live", environment errors become FAIL.

use minim_core::{ConfigurationError, QueryError, RuleDefinitionError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal evaluation failure. Nothing partial is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A single rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleEvaluationError {
    /// The pattern was rejected by the query capability.
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    /// The rule was rejected when the constraint model was loaded.
    #[error("rule rejected: {0}")]
    Rejected(#[from] RuleDefinitionError),

    /// The command rule's response pattern is not a valid regular expression.
    #[error("invalid response pattern '{pattern}': {reason}")]
    BadResponse { pattern: String, reason: String },
}

/// A liveness probe did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LivenessCheckError {
    #[error("not a valid URI: {0}")]
    InvalidUri(String),

    #[error("unsupported URI scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

/// The software-environment oracle could not run a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("command execution is disabled")]
    Disabled,

    #[error("empty command")]
    EmptyCommand,

    #[error("failed to start '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("command exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

/// Engine configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}
