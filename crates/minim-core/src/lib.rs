//! # minim-core
//!
//! The deterministic checklist logic for Minim.
//!
//! This crate decides how well a research object, described as a graph,
//! satisfies a checklist of MUST/SHOULD/MAY requirements. It holds everything
//! that can be computed without touching the network or the file system.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Never mutates the artifact graph or the constraint model
//! - Uses `BTreeMap`/`BTreeSet` only, so every report is reproducible
//! - Reports problems as values (`RuleRef::Rejected`, `Outcome::diagnostic`)
//! - Has NO async, NO network dependencies (pure Rust)
//!
//! Rule evaluation against live resources lives in `minim-eval`.

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregate;
pub mod fingerprint;
pub mod graph;
pub mod model;
pub mod outcome;
pub mod primitives;
pub mod query;
pub mod render;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Bindings, ConfigurationError, Level, Literal, QueryError, RenderError, RuleDefinitionError,
    SatisfactionLevel, Status, Term, Triple,
};

// =============================================================================
// RE-EXPORTS: Checklist Engine
// =============================================================================

pub use aggregate::{EvaluationResult, ItemReport, MissingItem, aggregate};
pub use fingerprint::{fingerprint, verify_fingerprint};
pub use graph::Graph;
pub use model::{
    Checklist, ConstraintModel, ForEachRule, Messages, Model, Requirement, Rule, RuleKind, RuleRef,
};
pub use outcome::{MessageKind, Outcome};
pub use query::{Pattern, PatternMatcher, QueryCapability};
pub use render::{UriTemplate, render, render_or_diagnostic};
