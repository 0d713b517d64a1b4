//! # Aggregator
//!
//! Combines per-requirement outcomes into an [`EvaluationResult`].
//!
//! All three levels start satisfied. Every FAIL downgrades its own level and
//! every weaker one:
//!
//! | Failure at | Clears             |
//! |------------|--------------------|
//! | MUST       | MUST, SHOULD, MAY  |
//! | SHOULD     | SHOULD, MAY        |
//! | MAY        | MAY                |
//!
//! NOMATCH is informational and never downgrades. Requirement order only
//! affects the order of the missing lists and the item report.

use crate::model::Requirement;
use crate::outcome::Outcome;
use crate::render::render_or_diagnostic;
use crate::{Level, SatisfactionLevel, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A failed requirement as listed in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingItem {
    pub seq: String,
    pub level: Level,
    pub rule: String,
    /// Rendered Fail (or NoMatch) message.
    pub message: String,
}

/// Full per-requirement line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub seq: String,
    pub level: Level,
    pub rule: String,
    pub status: Status,
    /// Rendered `show` description, if the rule has one.
    pub show: Option<String>,
    /// Rendered outcome message.
    pub message: String,
}

/// Result of evaluating one artifact against one checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub target: String,
    pub purpose: String,
    pub model: String,
    /// Satisfied levels, strictest first.
    pub summary: Vec<SatisfactionLevel>,
    pub missing_must: Vec<MissingItem>,
    pub missing_should: Vec<MissingItem>,
    pub missing_may: Vec<MissingItem>,
    pub items: Vec<ItemReport>,
}

impl EvaluationResult {
    /// Whether `level` remains satisfied.
    #[must_use]
    pub fn satisfies(&self, level: Level) -> bool {
        self.summary.contains(&level.satisfaction())
    }

    /// Failed requirements at `level`.
    #[must_use]
    pub fn missing(&self, level: Level) -> &[MissingItem] {
        match level {
            Level::Must => &self.missing_must,
            Level::Should => &self.missing_should,
            Level::May => &self.missing_may,
        }
    }

    fn missing_mut(&mut self, level: Level) -> &mut Vec<MissingItem> {
        match level {
            Level::Must => &mut self.missing_must,
            Level::Should => &mut self.missing_should,
            Level::May => &mut self.missing_may,
        }
    }
}

/// Aggregate outcomes, given in requirement order, into a result.
#[must_use]
pub fn aggregate(
    target: &str,
    purpose: &str,
    model: &str,
    outcomes: Vec<(Requirement, Outcome)>,
) -> EvaluationResult {
    let mut satisfied: BTreeSet<Level> = Level::ALL.into_iter().collect();
    let mut result = EvaluationResult {
        target: target.to_string(),
        purpose: purpose.to_string(),
        model: model.to_string(),
        summary: Vec::new(),
        missing_must: Vec::new(),
        missing_should: Vec::new(),
        missing_may: Vec::new(),
        items: Vec::with_capacity(outcomes.len()),
    };

    for (requirement, outcome) in outcomes {
        let rule = requirement.rule.name().to_string();
        let messages = requirement.rule.messages();
        let message = outcome.text(&rule, messages);

        if outcome.is_failure() {
            for level in requirement.level.downgraded() {
                satisfied.remove(&level);
            }
            result.missing_mut(requirement.level).push(MissingItem {
                seq: requirement.seq.clone(),
                level: requirement.level,
                rule: rule.clone(),
                message: message.clone(),
            });
        }

        result.items.push(ItemReport {
            seq: requirement.seq,
            level: requirement.level,
            rule,
            status: outcome.status,
            show: messages
                .and_then(|m| m.show.as_deref())
                .map(|show| render_or_diagnostic(show, &outcome.bindings)),
            message,
        });
    }

    result.summary = Level::ALL
        .into_iter()
        .filter(|level| satisfied.contains(level))
        .map(Level::satisfaction)
        .collect();
    result
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target:  {}", self.target)?;
        writeln!(f, "Purpose: {}", self.purpose)?;
        writeln!(f, "Model:   {}", self.model)?;
        if self.summary.is_empty() {
            writeln!(f, "Summary: (none)")?;
        } else {
            let labels: Vec<_> = self.summary.iter().map(|s| s.as_str()).collect();
            writeln!(f, "Summary: {}", labels.join(", "))?;
        }
        for item in &self.items {
            write!(f, "  [{}] {:<6} {}", item.status, item.level.as_str(), item.message)?;
            if let Some(show) = &item.show {
                write!(f, " - {}", show)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
