//! Shared fixtures: graph builders and stub oracles.

#![allow(dead_code)]

use async_trait::async_trait;
use minim_core::primitives::MINIM_NS;
use minim_core::{Graph, Term};
use minim_eval::{
    EnvironmentError, EnvironmentOracle, EvalConfig, EvalContext, Evaluator, LivenessCheckError,
    LivenessOracle,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const RO: &str = "http://example.org/ro/";
pub const ORE_AGGREGATES: &str = "http://www.openarchives.org/ore/terms/aggregates";

pub fn ex(local: &str) -> Term {
    Term::iri(format!("http://example.org/{local}"))
}

pub fn minim(local: &str) -> Term {
    Term::iri(format!("{MINIM_NS}{local}"))
}

/// Research object aggregating `files` (relative to [`RO`]).
pub fn research_object(files: &[&str]) -> Graph {
    let mut graph = Graph::new();
    for file in files {
        graph.insert(
            Term::iri(RO),
            Term::iri(ORE_AGGREGATES),
            Term::iri(format!("{RO}{file}")),
        );
    }
    graph
}

/// Constraint graph builder for one checklist over one model.
pub struct Checklist {
    graph: Graph,
    count: usize,
}

impl Checklist {
    pub fn new(purpose: &str) -> Self {
        let mut graph = Graph::new();
        graph.insert(ex("checklist"), minim("forPurpose"), Term::literal(purpose));
        graph.insert(ex("checklist"), minim("toModel"), ex("model"));
        Self { graph, count: 0 }
    }

    /// Add a requirement; `properties` describe its rule.
    pub fn requirement(mut self, level: &str, rule: &str, properties: &[(&str, Term)]) -> Self {
        self.count += 1;
        let item = ex(&format!("item{}", self.count));
        self.graph.insert(
            ex("model"),
            minim(&format!("has{level}Requirement")),
            item.clone(),
        );
        self.graph
            .insert(item.clone(), minim("seq"), Term::literal(format!("{:02}", self.count)));
        self.graph.insert(item, minim("isDerivedBy"), ex(rule));
        for (property, value) in properties {
            self.graph.insert(ex(rule), minim(property), value.clone());
        }
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Live unless the URI is listed as dead. Counts oracle calls.
#[derive(Default)]
pub struct StubLiveness {
    dead: BTreeSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubLiveness {
    pub fn with_dead(uris: &[&str]) -> Self {
        Self {
            dead: uris.iter().map(|u| (*u).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessOracle for StubLiveness {
    async fn is_live(&self, uri: &str) -> Result<bool, LivenessCheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(!self.dead.contains(uri))
    }
}

/// Returns fixed output for every command.
pub struct StubEnvironment(pub &'static str);

#[async_trait]
impl EnvironmentOracle for StubEnvironment {
    async fn run(&self, _command: &str) -> Result<String, EnvironmentError> {
        Ok(self.0.to_string())
    }
}

pub fn evaluator_with(config: EvalConfig, liveness: Arc<StubLiveness>) -> Evaluator {
    Evaluator::new(EvalContext::with_oracles(
        config,
        liveness,
        Arc::new(StubEnvironment("Python 3.12.1")),
    ))
}

pub fn evaluator(liveness: Arc<StubLiveness>) -> Evaluator {
    evaluator_with(EvalConfig::default(), liveness)
}
