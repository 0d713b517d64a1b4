//! # Oracles
//!
//! The two suspension points of an evaluation: probing whether a resource is
//! reachable, and running a command in the software environment.
//!
//! Implementations do not enforce timeouts themselves; [`EvalContext`]
//! wraps every call in the configured per-call timeout.
//!
//! [`EvalContext`]: crate::EvalContext

mod http;
mod process;

pub use http::HttpLivenessOracle;
pub use process::{DisabledEnvironmentOracle, ProcessEnvironmentOracle};

use crate::error::{EnvironmentError, LivenessCheckError};
use async_trait::async_trait;

/// Answers whether a URI is currently reachable.
#[async_trait]
pub trait LivenessOracle: Send + Sync {
    /// `Ok(false)` means the resource answered but is absent; `Err` means the
    /// check itself failed. Callers treat both as "not live".
    async fn is_live(&self, uri: &str) -> Result<bool, LivenessCheckError>;
}

/// Runs a Command rule's command and returns its captured output.
#[async_trait]
pub trait EnvironmentOracle: Send + Sync {
    async fn run(&self, command: &str) -> Result<String, EnvironmentError>;
}
