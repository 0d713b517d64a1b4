//! # Evaluation Engine
//!
//! Runs every requirement of a checklist concurrently and aggregates the
//! outcomes.
//!
//! ## Resource model
//!
//! - One task per requirement, at most `workers` running at once
//! - Oracle calls carry per-call timeouts (see [`EvalContext`])
//! - The whole run carries `evaluation_timeout`; requirements still running
//!   at the deadline are aborted and reported as FAIL
//! - Results keep requirement order regardless of completion order

use crate::cache::ModelCache;
use crate::config::EvalConfig;
use crate::context::EvalContext;
use crate::error::{ConfigError, EvaluationError};
use crate::evaluator::RuleEvaluator;
use minim_core::primitives::{DEFAULT_TARGET_TEMPLATE, TARGET_RO_VAR, TARGET_URI_VAR};
use minim_core::{
    Bindings, ConfigurationError, ConstraintModel, EvaluationResult, Graph, Outcome, Term,
    UriTemplate, aggregate,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{Instant, timeout_at};

/// One checklist evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub artifact: Arc<Graph>,
    pub constraints: Arc<ConstraintModel>,
    /// URI of the research object, bound as `targetro`.
    pub artifact_uri: String,
    /// Target template selecting the checklist, expanded into `targeturi`.
    pub target_template: String,
    pub purpose: String,
}

impl EvaluationRequest {
    /// Request for the default target template `{+targetro}`.
    #[must_use]
    pub fn new(
        artifact: Arc<Graph>,
        constraints: Arc<ConstraintModel>,
        artifact_uri: impl Into<String>,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            artifact,
            constraints,
            artifact_uri: artifact_uri.into(),
            target_template: DEFAULT_TARGET_TEMPLATE.to_string(),
            purpose: purpose.into(),
        }
    }

    #[must_use]
    pub fn with_target_template(mut self, template: impl Into<String>) -> Self {
        self.target_template = template.into();
        self
    }

    /// `targetro` and `targeturi`, available to every pattern and message.
    pub fn standard_bindings(&self) -> Result<Bindings, ConfigurationError> {
        let bindings = Bindings::new().with(TARGET_RO_VAR, Term::iri(self.artifact_uri.clone()));
        let target = UriTemplate::parse(&self.target_template)
            .and_then(|template| template.expand(&bindings))
            .map_err(|e| ConfigurationError::TargetTemplate {
                template: self.target_template.clone(),
                reason: e.to_string(),
            })?;
        Ok(bindings.with(TARGET_URI_VAR, Term::iri(target)))
    }
}

/// Asynchronous checklist evaluator.
#[derive(Debug, Clone)]
pub struct Evaluator {
    context: Arc<EvalContext>,
    models: ModelCache,
}

impl Evaluator {
    #[must_use]
    pub fn new(context: EvalContext) -> Self {
        Self {
            context: Arc::new(context),
            models: ModelCache::default(),
        }
    }

    /// Evaluator with the default collaborators for `config`.
    pub fn from_config(config: EvalConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(EvalContext::new(config)?))
    }

    #[must_use]
    pub fn context(&self) -> &EvalContext {
        &self.context
    }

    /// Build (or fetch from cache) the constraint model for `fragments`.
    ///
    /// Rejected rules are logged here; requirements using them fail at
    /// evaluation time.
    pub fn load_constraints(
        &self,
        fragments: &[Graph],
    ) -> Result<Arc<ConstraintModel>, ConfigurationError> {
        let (model, fresh) = self.models.get_or_build(fragments, self.context.query())?;
        if fresh {
            for (rule, reason) in model.rejected_rules() {
                tracing::warn!(rule, %reason, "rejected rule definition");
            }
            for name in model.dangling_models() {
                tracing::warn!(model = name, "checklist refers to undefined model");
            }
            tracing::info!(
                fingerprint = model.fingerprint(),
                checklists = model.checklists().len(),
                "constraint model loaded"
            );
        }
        Ok(model)
    }

    /// Evaluate the artifact against the checklist selected by the request.
    pub async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        let constraints = Arc::clone(&request.constraints);
        let model = constraints.resolve_checklist(&request.target_template, &request.purpose)?;
        let items = constraints.items_of(model).to_vec();
        let initial = request.standard_bindings()?;
        let target = initial
            .get(TARGET_URI_VAR)
            .map(Term::to_string)
            .unwrap_or_default();

        tracing::info!(
            target = %target,
            purpose = %request.purpose,
            model = %model.name,
            items = items.len(),
            "evaluation started"
        );

        let config = self.context.config();
        let deadline = Instant::now() + config.evaluation_timeout();
        let permits = Arc::new(Semaphore::new(config.worker_permits()));

        let handles: Vec<_> = items
            .iter()
            .cloned()
            .map(|requirement| {
                let context = Arc::clone(&self.context);
                let artifact = Arc::clone(&request.artifact);
                let permits = Arc::clone(&permits);
                let initial = initial.clone();
                tokio::spawn(async move {
                    // The semaphore is never closed.
                    let _permit = permits.acquire_owned().await.ok();
                    RuleEvaluator::new(&context)
                        .evaluate_requirement(&requirement, &artifact, &initial)
                        .await
                })
            })
            .collect();

        let timeout_ms = config.evaluation_timeout_ms;
        let outcomes = futures::future::join_all(handles.into_iter().map(|handle| {
            let initial = initial.clone();
            async move {
                let abort = handle.abort_handle();
                match timeout_at(deadline, handle).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(e)) => Outcome::fail(initial)
                        .with_diagnostic(format!("evaluation task failed: {e}")),
                    Err(_) => {
                        abort.abort();
                        Outcome::fail(initial).with_diagnostic(format!(
                            "not evaluated: evaluation timed out after {timeout_ms} ms"
                        ))
                    }
                }
            }
        }))
        .await;

        for (requirement, outcome) in items.iter().zip(&outcomes) {
            tracing::debug!(
                seq = %requirement.seq,
                level = %requirement.level,
                rule = %requirement.rule.name(),
                status = %outcome.status,
                "requirement evaluated"
            );
        }

        let result = aggregate(
            &target,
            &request.purpose,
            &model.name,
            items.into_iter().zip(outcomes).collect(),
        );

        let summary: Vec<_> = result.summary.iter().map(|s| s.as_str()).collect();
        tracing::info!(
            target = %target,
            summary = %summary.join(","),
            missing_must = result.missing_must.len(),
            missing_should = result.missing_should.len(),
            missing_may = result.missing_may.len(),
            "evaluation finished"
        );
        Ok(result)
    }
}
