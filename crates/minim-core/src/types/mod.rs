//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the Minim engine:
//! - Graph terms and triples (`Term`, `Literal`, `Triple`)
//! - Variable bindings returned by queries (`Bindings`)
//! - Requirement strictness (`Level`) and its report label (`SatisfactionLevel`)
//! - Per-rule result state (`Status`)
//! - Error types for configuration, rule definitions and rendering
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Carry no interior mutability

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// TERMS
// =============================================================================

/// Literal component of a graph term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// The lexical form.
    pub lexical: String,
    /// Datatype IRI, if typed.
    pub datatype: Option<String>,
    /// Language tag, if tagged.
    pub lang: Option<String>,
}

/// A node or value in a graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A resource identified by an IRI.
    Iri(String),
    /// A literal value.
    Literal(Literal),
    /// A blank node, identified by its local label.
    Blank(String),
}

impl Term {
    /// Create an IRI term.
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Create a plain string literal.
    #[must_use]
    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
            lang: None,
        })
    }

    /// Create a typed literal.
    #[must_use]
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal(Literal {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            lang: None,
        })
    }

    /// Create a language-tagged literal.
    #[must_use]
    pub fn lang(lexical: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
            lang: Some(lang.into()),
        })
    }

    /// Create an `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: u64) -> Self {
        Self::typed(value.to_string(), crate::primitives::XSD_INTEGER)
    }

    /// Create a blank node term.
    #[must_use]
    pub fn blank(label: impl Into<String>) -> Self {
        Self::Blank(label.into())
    }

    /// The lexical form, if this is a literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(lit) => Some(&lit.lexical),
            _ => None,
        }
    }

    /// Parse a literal as a non-negative integer.
    ///
    /// Accepts untyped literals and any datatype; surrounding whitespace is ignored.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_literal()
            .and_then(|lexical| lexical.trim().parse::<u64>().ok())
    }
}

/// String form used for message rendering and node identity.
///
/// IRIs render as their text, literals as their lexical form,
/// blank nodes as `_:label`.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => f.write_str(iri),
            Self::Literal(lit) => f.write_str(&lit.lexical),
            Self::Blank(label) => write!(f, "_:{}", label),
        }
    }
}

// =============================================================================
// TRIPLE
// =============================================================================

/// A single statement `(subject, predicate, object)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    /// Create a new triple.
    #[must_use]
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

// =============================================================================
// BINDINGS
// =============================================================================

/// A set of variable bindings produced by a query.
///
/// Uses `BTreeMap` so iteration (and therefore every rendered report) is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bindings(BTreeMap<String, Term>);

impl Bindings {
    /// Create an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `term`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, term: Term) {
        self.0.insert(name.into(), term);
    }

    /// Builder-style `insert`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, term: Term) -> Self {
        self.insert(name, term);
        self
    }

    /// Get the term bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.0.get(name)
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return a copy of `self` with every binding of `other` layered on top.
    #[must_use]
    pub fn merged(&self, other: &Bindings) -> Bindings {
        let mut merged = self.clone();
        for (name, term) in &other.0 {
            merged.0.insert(name.clone(), term.clone());
        }
        merged
    }
}

impl FromIterator<(String, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Term)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// LEVELS
// =============================================================================

/// Strictness of a requirement.
///
/// Ordered from strictest to weakest, so sorting by `Level` gives the
/// report order MUST → SHOULD → MAY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Must,
    Should,
    May,
}

impl Level {
    /// All levels in strictness order.
    pub const ALL: [Level; 3] = [Level::Must, Level::Should, Level::May];

    /// The qualitative label reported when this level is satisfied.
    #[must_use]
    pub const fn satisfaction(self) -> SatisfactionLevel {
        match self {
            Level::Must => SatisfactionLevel::MinimallySatisfies,
            Level::Should => SatisfactionLevel::NominallySatisfies,
            Level::May => SatisfactionLevel::FullySatisfies,
        }
    }

    /// Levels cleared by a failure at this level (this one and every weaker one).
    #[must_use]
    pub fn downgraded(self) -> impl Iterator<Item = Level> {
        Level::ALL.into_iter().filter(move |level| *level >= self)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Must => "MUST",
            Level::Should => "SHOULD",
            Level::May => "MAY",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label of a satisfied strictness level in a report summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SatisfactionLevel {
    MinimallySatisfies,
    NominallySatisfies,
    FullySatisfies,
}

impl SatisfactionLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinimallySatisfies => "minimallySatisfies",
            Self::NominallySatisfies => "nominallySatisfies",
            Self::FullySatisfies => "fullySatisfies",
        }
    }
}

impl fmt::Display for SatisfactionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Result state of one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
    /// No resources matched a ForEach rule. Informational, not a failure.
    NoMatch,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::NoMatch => "NOMATCH",
        })
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Malformed pattern or oversized result from the query capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The pattern text could not be parsed.
    #[error("malformed pattern at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// A prefixed name used an undeclared prefix.
    #[error("unknown prefix '{0}'")]
    UnknownPrefix(String),

    /// The pattern is larger than the matcher accepts.
    #[error("pattern has {count} triples, limit is {limit}")]
    TooManyTriples { count: usize, limit: usize },

    /// The result set exceeded the row limit.
    #[error("query produced more than {limit} results")]
    TooManyResults { limit: usize },
}

/// Fatal configuration problems. Abort the whole evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No checklist matches the requested target and purpose.
    #[error("no checklist for target '{target}' and purpose '{purpose}'")]
    NoChecklist { target: String, purpose: String },

    /// The checklist's model reference points at nothing.
    #[error("checklist '{checklist}' refers to undefined model '{model}'")]
    DanglingModel { checklist: String, model: String },

    /// The target template cannot be expanded with the standard bindings.
    #[error("invalid target template '{template}': {reason}")]
    TargetTemplate { template: String, reason: String },

    /// The constraint graph could not be queried.
    #[error("constraint graph query failed: {0}")]
    Query(#[from] QueryError),
}

/// Reasons a rule definition is rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDefinitionError {
    /// None of `query`, `exists` or `command` is present.
    #[error("rule has no query, exists or command property")]
    NoKind,

    /// Properties of more than one rule kind are present.
    #[error("rule mixes '{first}' with '{second}'")]
    ConflictingProperties {
        first: &'static str,
        second: &'static str,
    },

    /// A pattern property points at a node without pattern text.
    #[error("'{0}' has no pattern text")]
    MissingPattern(&'static str),

    /// A command rule has no response pattern.
    #[error("command rule has no response pattern")]
    MissingResponse,

    /// `min`/`max` is not a non-negative integer.
    #[error("'{property}' is not a non-negative integer: {value}")]
    BadBound {
        property: &'static str,
        value: String,
    },

    /// `min` exceeds `max`.
    #[error("min {min} exceeds max {max}")]
    EmptyRange { min: u64, max: u64 },

    /// The liveness URI template is malformed.
    #[error("bad liveness template: {0}")]
    BadTemplate(RenderError),

    /// The item has no `isDerivedBy` rule.
    #[error("requirement has no rule")]
    MissingRule,
}

/// Message or URI template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A placeholder names a variable that is not bound.
    #[error("missing binding '{0}'")]
    MissingBinding(String),

    /// A placeholder is not terminated or has an empty name.
    #[error("malformed placeholder at offset {0}")]
    Malformed(usize),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_display_uses_string_form() {
        assert_eq!(Term::iri("http://example.org/a").to_string(), "http://example.org/a");
        assert_eq!(Term::lang("hello", "en").to_string(), "hello");
        assert_eq!(Term::blank("b0").to_string(), "_:b0");
    }

    #[test]
    fn term_integer_parsing() {
        assert_eq!(Term::integer(3).as_u64(), Some(3));
        assert_eq!(Term::literal(" 7 ").as_u64(), Some(7));
        assert_eq!(Term::literal("-1").as_u64(), None);
        assert_eq!(Term::iri("http://example.org/3").as_u64(), None);
    }

    #[test]
    fn bindings_merge_prefers_right() {
        let left = Bindings::new()
            .with("a", Term::literal("1"))
            .with("b", Term::literal("2"));
        let right = Bindings::new().with("b", Term::literal("3"));

        let merged = left.merged(&right);
        assert_eq!(merged.get("a"), Some(&Term::literal("1")));
        assert_eq!(merged.get("b"), Some(&Term::literal("3")));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn bindings_iterate_in_name_order() {
        let bindings = Bindings::new()
            .with("z", Term::literal("1"))
            .with("a", Term::literal("2"));
        let names: Vec<_> = bindings.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "z"]);
    }

    #[test]
    fn level_downgrade_is_monotonic() {
        let must: Vec<_> = Level::Must.downgraded().collect();
        let should: Vec<_> = Level::Should.downgraded().collect();
        let may: Vec<_> = Level::May.downgraded().collect();

        assert_eq!(must, vec![Level::Must, Level::Should, Level::May]);
        assert_eq!(should, vec![Level::Should, Level::May]);
        assert_eq!(may, vec![Level::May]);
    }

    #[test]
    fn satisfaction_labels() {
        assert_eq!(Level::Must.satisfaction().as_str(), "minimallySatisfies");
        assert_eq!(Level::Should.satisfaction().as_str(), "nominallySatisfies");
        assert_eq!(Level::May.satisfaction().as_str(), "fullySatisfies");
    }
}
