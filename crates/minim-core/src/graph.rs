//! # Graph
//!
//! Deterministic in-memory triple store for artifact and constraint graphs.
//!
//! Triples keep their insertion position; every lookup returns triples in
//! that order so query results (and reports built from them) are stable.
//! All indexes use `BTreeMap` for deterministic ordering.

use crate::{Term, Triple};
use std::collections::{BTreeMap, BTreeSet};

/// An in-memory set of triples with subject, predicate and object indexes.
///
/// Duplicate triples are ignored. Graphs are built by the caller and are
/// only read during evaluation.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Triples in insertion order.
    triples: Vec<Triple>,

    /// Membership set for duplicate detection.
    members: BTreeSet<Triple>,

    /// subject -> positions in `triples`
    by_subject: BTreeMap<Term, Vec<usize>>,

    /// predicate -> positions in `triples`
    by_predicate: BTreeMap<Term, Vec<usize>>,

    /// object -> positions in `triples`
    by_object: BTreeMap<Term, Vec<usize>>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, subject: Term, predicate: Term, object: Term) -> bool {
        self.insert_triple(Triple::new(subject, predicate, object))
    }

    /// Insert a triple value. Returns `false` if it was already present.
    pub fn insert_triple(&mut self, triple: Triple) -> bool {
        if self.members.contains(&triple) {
            return false;
        }
        let position = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(position);
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .push(position);
        self.by_object
            .entry(triple.object.clone())
            .or_default()
            .push(position);
        self.members.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Number of triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph has no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Whether the graph contains the exact triple.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.members.contains(triple)
    }

    /// All triples in insertion order.
    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples matching the given positions, in insertion order.
    ///
    /// `None` acts as a wildcard. The smallest applicable index drives the scan.
    pub fn matching<'a>(
        &'a self,
        subject: Option<&'a Term>,
        predicate: Option<&'a Term>,
        object: Option<&'a Term>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        let candidates = [
            subject.map(|term| self.by_subject.get(term)),
            predicate.map(|term| self.by_predicate.get(term)),
            object.map(|term| self.by_object.get(term)),
        ];

        // Any bound position with no index entry means no match at all.
        if candidates.iter().any(|c| matches!(c, Some(None))) {
            return Box::new(std::iter::empty());
        }

        let smallest = candidates
            .into_iter()
            .flatten()
            .flatten()
            .min_by_key(|positions| positions.len());

        let filter = move |triple: &&Triple| {
            subject.is_none_or(|s| triple.subject == *s)
                && predicate.is_none_or(|p| triple.predicate == *p)
                && object.is_none_or(|o| triple.object == *o)
        };

        match smallest {
            Some(positions) => Box::new(
                positions
                    .iter()
                    .map(move |&position| &self.triples[position])
                    .filter(filter),
            ),
            None => Box::new(self.triples.iter().filter(filter)),
        }
    }

    /// Objects of `(subject, predicate, ?)` in insertion order.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(Some(subject), Some(predicate), None)
            .map(|triple| &triple.object)
    }

    /// Subjects of `(?, predicate, object)` in insertion order.
    pub fn subjects<'a>(
        &'a self,
        predicate: &'a Term,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(None, Some(predicate), Some(object))
            .map(|triple| &triple.subject)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for triple in iter {
            graph.insert_triple(triple);
        }
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert_triple(triple);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
