//! # Rule Evaluator
//!
//! Applies one rule to the artifact graph.
//!
//! - **Exists**: PASS on at least one solution, else FAIL
//! - **ForEach**: NOMATCH on zero solutions (FAIL when `min > 0`); otherwise
//!   every solution must pass its per-binding test and the solution count must
//!   lie in `[min, max]`
//! - **Command**: PASS when the environment oracle's output matches `response`
//!
//! Oracle failures never surface as errors: they become FAIL outcomes with a
//! diagnostic. Only malformed patterns, rejected rules and invalid response
//! expressions are [`RuleEvaluationError`]s, and `evaluate_requirement`
//! recovers those too.

use crate::context::EvalContext;
use crate::error::RuleEvaluationError;
use minim_core::{
    Bindings, ForEachRule, Graph, MessageKind, Outcome, Pattern, Requirement, Rule, RuleKind,
    RuleRef, Term,
};
use regex::Regex;

/// Evaluates rules within one evaluation context.
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator<'a> {
    context: &'a EvalContext,
}

impl<'a> RuleEvaluator<'a> {
    #[must_use]
    pub fn new(context: &'a EvalContext) -> Self {
        Self { context }
    }

    /// Evaluate a requirement's rule, turning every error into a FAIL outcome.
    pub async fn evaluate_requirement(
        &self,
        requirement: &Requirement,
        artifact: &Graph,
        initial: &Bindings,
    ) -> Outcome {
        let result = match &requirement.rule {
            RuleRef::Rule(rule) => self.evaluate(rule, artifact, initial).await,
            RuleRef::Rejected { reason, .. } => Err(RuleEvaluationError::from(reason.clone())),
        };
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    requirement = %requirement.id,
                    rule = %requirement.rule.name(),
                    error = %e,
                    "rule evaluation failed"
                );
                Outcome::fail(initial.clone()).with_diagnostic(e.to_string())
            }
        }
    }

    /// Evaluate a rule against the artifact graph.
    pub async fn evaluate(
        &self,
        rule: &Rule,
        artifact: &Graph,
        initial: &Bindings,
    ) -> Result<Outcome, RuleEvaluationError> {
        match &rule.kind {
            RuleKind::Exists { pattern } => self.exists(pattern, artifact, initial),
            RuleKind::ForEach(foreach) => self.for_each(foreach, artifact, initial).await,
            RuleKind::Command { command, response } => {
                self.command(command, response, initial).await
            }
        }
    }

    fn select(
        &self,
        pattern: &Pattern,
        artifact: &Graph,
        initial: &Bindings,
    ) -> Result<Vec<Bindings>, RuleEvaluationError> {
        Ok(self.context.query().select(artifact, pattern, initial)?)
    }

    fn exists(
        &self,
        pattern: &Pattern,
        artifact: &Graph,
        initial: &Bindings,
    ) -> Result<Outcome, RuleEvaluationError> {
        let rows = self.select(pattern, artifact, initial)?;
        Ok(match rows.first() {
            Some(row) => Outcome::pass(initial.merged(row)),
            None => Outcome::fail(initial.clone()),
        })
    }

    async fn for_each(
        &self,
        rule: &ForEachRule,
        artifact: &Graph,
        initial: &Bindings,
    ) -> Result<Outcome, RuleEvaluationError> {
        let rows = self.select(&rule.pattern, artifact, initial)?;
        let count = rows.len();

        let Some(last) = rows.last() else {
            return Ok(if rule.requires_match() {
                Outcome::fail(initial.clone())
                    .with_message(MessageKind::NoMatch)
                    .with_matched(0)
            } else {
                Outcome::no_match(initial.clone())
            });
        };

        if !rule.admits(count as u64) {
            let expected = match rule.max {
                Some(max) => format!("{}..={}", rule.min.unwrap_or(0), max),
                None => format!("at least {}", rule.min.unwrap_or(0)),
            };
            return Ok(Outcome::fail(initial.merged(last))
                .with_matched(count)
                .with_diagnostic(format!("{count} matches, expected {expected}")));
        }

        for row in &rows {
            let bindings = initial.merged(row);
            if let Some(template) = &rule.is_live {
                let diagnostic = match template.expand(&bindings) {
                    Ok(uri) => {
                        let live = self.context.probe(&uri).await;
                        (!live).then(|| format!("{uri} is not live"))
                    }
                    Err(e) => Some(format!("cannot build URI from '{template}': {e}")),
                };
                if let Some(diagnostic) = diagnostic {
                    return Ok(Outcome::fail(bindings)
                        .with_matched(count)
                        .with_diagnostic(diagnostic));
                }
            }
            if let Some(exists) = &rule.exists
                && self.select(exists, artifact, &bindings)?.is_empty()
            {
                return Ok(Outcome::fail(bindings).with_matched(count));
            }
        }

        Ok(Outcome::pass(initial.merged(last)).with_matched(count))
    }

    async fn command(
        &self,
        command: &str,
        response: &str,
        initial: &Bindings,
    ) -> Result<Outcome, RuleEvaluationError> {
        let expected = Regex::new(response).map_err(|e| RuleEvaluationError::BadResponse {
            pattern: response.to_string(),
            reason: e.to_string(),
        })?;
        let bindings = initial
            .clone()
            .with("command", Term::literal(command))
            .with("response", Term::literal(response));

        Ok(match self.context.run_command(command).await {
            Ok(output) => {
                let matched = expected.is_match(&output);
                let bindings = bindings.with("output", Term::literal(output.trim()));
                if matched {
                    Outcome::pass(bindings)
                } else {
                    Outcome::fail(bindings).with_diagnostic(format!(
                        "output of '{command}' does not match '{response}'"
                    ))
                }
            }
            Err(e) => {
                tracing::warn!(command, error = %e, "command rule failed");
                Outcome::fail(bindings).with_diagnostic(e.to_string())
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
