//! # Outcome
//!
//! The result of applying one rule to the artifact graph.

use crate::model::Messages;
use crate::render::render_or_diagnostic;
use crate::{Bindings, Status};
use serde::{Deserialize, Serialize};

/// Which of a rule's message templates describes an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    Pass,
    Fail,
    NoMatch,
}

/// Status, message selection and rendering context of one rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    pub message: MessageKind,
    /// Bindings the selected message is rendered with.
    pub bindings: Bindings,
    /// Why the rule failed, when the failure is not self-explanatory.
    pub diagnostic: Option<String>,
    /// Number of outer bindings (ForEach only).
    pub matched: Option<usize>,
}

impl Outcome {
    #[must_use]
    pub fn pass(bindings: Bindings) -> Self {
        Self {
            status: Status::Pass,
            message: MessageKind::Pass,
            bindings,
            diagnostic: None,
            matched: None,
        }
    }

    #[must_use]
    pub fn fail(bindings: Bindings) -> Self {
        Self {
            status: Status::Fail,
            message: MessageKind::Fail,
            bindings,
            diagnostic: None,
            matched: None,
        }
    }

    #[must_use]
    pub fn no_match(bindings: Bindings) -> Self {
        Self {
            status: Status::NoMatch,
            message: MessageKind::NoMatch,
            bindings,
            diagnostic: None,
            matched: Some(0),
        }
    }

    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: MessageKind) -> Self {
        self.message = message;
        self
    }

    #[must_use]
    pub fn with_matched(mut self, matched: usize) -> Self {
        self.matched = Some(matched);
        self
    }

    /// Whether this outcome counts against its requirement level.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == Status::Fail
    }

    /// Render the selected message.
    ///
    /// Falls back to a default naming `rule` when the rule has no template
    /// for this kind; `NoMatch` falls back to the Fail template first. The
    /// diagnostic, if any, is appended in parentheses.
    #[must_use]
    pub fn text(&self, rule: &str, messages: Option<&Messages>) -> String {
        let template = messages.and_then(|m| match self.message {
            MessageKind::Pass => m.pass.as_deref(),
            MessageKind::Fail => m.fail.as_deref(),
            MessageKind::NoMatch => m.no_match.as_deref().or(m.fail.as_deref()),
        });
        let text = match template {
            Some(template) => render_or_diagnostic(template, &self.bindings),
            None => match self.message {
                MessageKind::Pass => format!("{} passed", rule),
                MessageKind::Fail => format!("{} failed", rule),
                MessageKind::NoMatch => format!("{}: no matching resources", rule),
            },
        };
        match &self.diagnostic {
            Some(diagnostic) => format!("{} ({})", text, diagnostic),
            None => text,
        }
    }
}
