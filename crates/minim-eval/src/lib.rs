//! # minim-eval
//!
//! Asynchronous evaluation of Minim checklists.
//!
//! This crate provides:
//! - The evaluation context (query capability, oracles, caches, config)
//! - The rule evaluator for Exists, ForEach and Command rules
//! - A bounded, deadline-aware engine over all requirements of a checklist
//! - Default oracles: HTTP/`file:` liveness and child-process commands
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  minim-eval (THE ENGINE)                 │
//! │                                                          │
//! │  ┌────────────┐   ┌────────────┐   ┌─────────────────┐   │
//! │  │  Evaluator │──▶│    Rule    │──▶│     Oracles     │   │
//! │  │  (tokio)   │   │  Evaluator │   │ (reqwest, proc) │   │
//! │  └─────┬──────┘   └─────┬──────┘   └─────────────────┘   │
//! │        │                │                                │
//! │        └────────┬───────┘                                │
//! │                 ▼                                        │
//! │         ┌───────────────┐                                │
//! │         │  minim-core   │                                │
//! │         │  (THE LOGIC)  │                                │
//! │         └───────────────┘                                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use minim_eval::{EvalConfig, EvaluationRequest, Evaluator};
//! use minim_core::Graph;
//! use std::sync::Arc;
//!
//! # async fn run(artifact: Graph, checklist: Graph) -> Result<(), Box<dyn std::error::Error>> {
//! minim_eval::telemetry::init();
//! let evaluator = Evaluator::from_config(EvalConfig::default())?;
//! let constraints = evaluator.load_constraints(&[checklist])?;
//! let request = EvaluationRequest::new(
//!     Arc::new(artifact),
//!     constraints,
//!     "http://example.org/ro/",
//!     "Runnable",
//! );
//! let result = evaluator.evaluate(request).await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod oracle;
pub mod telemetry;

pub use cache::{LivenessCache, ModelCache};
pub use config::EvalConfig;
pub use context::EvalContext;
pub use engine::{EvaluationRequest, Evaluator};
pub use error::{
    ConfigError, EnvironmentError, EvaluationError, LivenessCheckError, RuleEvaluationError,
};
pub use evaluator::RuleEvaluator;
pub use oracle::{
    DisabledEnvironmentOracle, EnvironmentOracle, HttpLivenessOracle, LivenessOracle,
    ProcessEnvironmentOracle,
};
