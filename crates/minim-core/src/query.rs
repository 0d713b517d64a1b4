//! # Query Module
//!
//! The query capability consumed by the constraint model store and the rule
//! evaluator, plus a reference implementation.
//!
//! - `QueryCapability` is the seam: pattern in, variable bindings out
//! - `PatternMatcher` answers conjunctive triple patterns over a [`Graph`]
//! - Results are deterministic (graph insertion order, left-to-right joins)
//!
//! ## Reference pattern syntax
//!
//! ```text
//! PREFIX ex: <http://example.org/>
//! ?ro ore:aggregates ?file . ?file a ro:Resource ; dct:title ?title
//! ```
//!
//! Supported: `PREFIX` headers, an optional surrounding `{ }`, variables
//! (`?x`/`$x`), IRIs, prefixed names, `a`, string literals with `@lang` or
//! `^^datatype`, integers, booleans, blank nodes as hidden variables, and the
//! `;`/`,` shorthands. Filters, optionals, unions and aggregates are not.

use crate::graph::Graph;
use crate::primitives::{
    DEFAULT_PREFIXES, MAX_PATTERN_LENGTH, MAX_PATTERN_TRIPLES, MAX_RESULT_ROWS, RDF_TYPE,
};
use crate::{Bindings, QueryError, Term};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// PATTERN
// =============================================================================

/// Pattern text in the query language of the active [`QueryCapability`].
///
/// Opaque to everything except the capability that executes it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pattern(String);

impl Pattern {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// QUERY CAPABILITY
// =============================================================================

/// Executes a pattern against a graph.
///
/// Every returned binding set contains the `initial` bindings plus the
/// variables bound by the match. An empty vector means no match.
pub trait QueryCapability: Send + Sync {
    fn select(
        &self,
        graph: &Graph,
        pattern: &Pattern,
        initial: &Bindings,
    ) -> Result<Vec<Bindings>, QueryError>;
}

// =============================================================================
// TRIPLE PATTERNS
// =============================================================================

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Var(String),
    Term(Term),
}

impl Slot {
    fn resolve<'a>(&'a self, row: &'a Bindings) -> Option<&'a Term> {
        match self {
            Slot::Term(term) => Some(term),
            Slot::Var(name) => row.get(name),
        }
    }

    fn bind(&self, value: &Term, row: &mut Bindings) -> bool {
        match self {
            Slot::Term(term) => term == value,
            Slot::Var(name) => match row.get(name) {
                Some(existing) => existing == value,
                None => {
                    row.insert(name.clone(), value.clone());
                    true
                }
            },
        }
    }
}

/// A parsed `subject predicate object` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Slot,
    pub predicate: Slot,
    pub object: Slot,
}

impl TriplePattern {
    fn bound_count(&self, row: &Bindings) -> usize {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter(|slot| slot.resolve(row).is_some())
            .count()
    }
}

/// Prefix for variables standing in for blank nodes; never returned.
const HIDDEN_VAR: &str = "_:";

// =============================================================================
// PATTERN MATCHER
// =============================================================================

/// Reference [`QueryCapability`] over the in-memory [`Graph`].
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    prefixes: BTreeMap<String, String>,
    row_limit: usize,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES
                .iter()
                .map(|(name, iri)| ((*name).to_string(), (*iri).to_string()))
                .collect(),
            row_limit: MAX_RESULT_ROWS,
        }
    }
}

impl PatternMatcher {
    /// Matcher with the default prefix table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a prefix available to every pattern.
    #[must_use]
    pub fn with_prefix(mut self, name: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(name.into(), iri.into());
        self
    }

    /// Override the result row limit.
    #[must_use]
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    /// Parse pattern text into triple patterns.
    pub fn parse(&self, pattern: &Pattern) -> Result<Vec<TriplePattern>, QueryError> {
        let text = pattern.as_str();
        if text.len() > MAX_PATTERN_LENGTH {
            return Err(QueryError::Malformed {
                offset: MAX_PATTERN_LENGTH,
                reason: format!("pattern longer than {} bytes", MAX_PATTERN_LENGTH),
            });
        }
        let tokens = lex(text)?;
        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
            end: text.len(),
            prefixes: self.prefixes.clone(),
            blank_count: 0,
        };
        let triples = parser.parse()?;
        if triples.len() > MAX_PATTERN_TRIPLES {
            return Err(QueryError::TooManyTriples {
                count: triples.len(),
                limit: MAX_PATTERN_TRIPLES,
            });
        }
        Ok(triples)
    }

    fn extend(
        &self,
        graph: &Graph,
        pending: &[&TriplePattern],
        row: &Bindings,
        out: &mut Vec<Bindings>,
    ) -> Result<(), QueryError> {
        // Most-bound pattern first; ties keep textual order.
        let Some((index, best)) = pending
            .iter()
            .enumerate()
            .max_by_key(|(i, p)| (p.bound_count(row), Reverse(*i)))
        else {
            if out.len() >= self.row_limit {
                return Err(QueryError::TooManyResults {
                    limit: self.row_limit,
                });
            }
            out.push(visible(row));
            return Ok(());
        };

        let rest: Vec<&TriplePattern> = pending
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| *p)
            .collect();

        let subject = best.subject.resolve(row);
        let predicate = best.predicate.resolve(row);
        let object = best.object.resolve(row);

        for triple in graph.matching(subject, predicate, object) {
            let mut next = row.clone();
            if best.subject.bind(&triple.subject, &mut next)
                && best.predicate.bind(&triple.predicate, &mut next)
                && best.object.bind(&triple.object, &mut next)
            {
                self.extend(graph, &rest, &next, out)?;
            }
        }
        Ok(())
    }
}

impl QueryCapability for PatternMatcher {
    fn select(
        &self,
        graph: &Graph,
        pattern: &Pattern,
        initial: &Bindings,
    ) -> Result<Vec<Bindings>, QueryError> {
        let triples = self.parse(pattern)?;
        let pending: Vec<&TriplePattern> = triples.iter().collect();
        let mut out = Vec::new();
        self.extend(graph, &pending, initial, &mut out)?;
        Ok(out)
    }
}

fn visible(row: &Bindings) -> Bindings {
    row.iter()
        .filter(|(name, _)| !name.starts_with(HIDDEN_VAR))
        .map(|(name, term)| (name.to_string(), term.clone()))
        .collect()
}

// =============================================================================
// LEXER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Iri(String),
    Word(String),
    Var(String),
    Str(String),
    LangTag(String),
    DoubleCaret,
    Dot,
    Semicolon,
    Comma,
    LBrace,
    RBrace,
}

fn malformed(offset: usize, reason: impl Into<String>) -> QueryError {
    QueryError::Malformed {
        offset,
        reason: reason.into(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_word_break(c: char) -> bool {
    c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '{' | '}' | ';' | ',' | '#')
}

fn lex(text: &str) -> Result<Vec<(usize, Token)>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '<' => {
                chars.next();
                let mut iri = String::new();
                loop {
                    match chars.next() {
                        Some((_, '>')) => break,
                        Some((offset, c)) if c.is_whitespace() => {
                            return Err(malformed(offset, "whitespace inside IRI"));
                        }
                        Some((_, c)) => iri.push(c),
                        None => return Err(malformed(start, "unterminated IRI")),
                    }
                }
                tokens.push((start, Token::Iri(iri)));
            }
            '?' | '$' => {
                chars.next();
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(malformed(start, "empty variable name"));
                }
                tokens.push((start, Token::Var(name)));
            }
            '"' | '\'' => {
                chars.next();
                let quote = c;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((offset, '\\')) => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, 'r')) => value.push('\r'),
                            Some((_, c @ ('"' | '\'' | '\\'))) => value.push(c),
                            _ => return Err(malformed(offset, "bad escape sequence")),
                        },
                        Some((_, c)) => value.push(c),
                        None => return Err(malformed(start, "unterminated string")),
                    }
                }
                tokens.push((start, Token::Str(value)));
            }
            '@' => {
                chars.next();
                let mut tag = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '-' {
                        tag.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if tag.is_empty() {
                    return Err(malformed(start, "empty language tag"));
                }
                tokens.push((start, Token::LangTag(tag)));
            }
            '^' => {
                chars.next();
                match chars.next() {
                    Some((_, '^')) => tokens.push((start, Token::DoubleCaret)),
                    _ => return Err(malformed(start, "expected '^^'")),
                }
            }
            '.' => {
                chars.next();
                tokens.push((start, Token::Dot));
            }
            ';' => {
                chars.next();
                tokens.push((start, Token::Semicolon));
            }
            ',' => {
                chars.next();
                tokens.push((start, Token::Comma));
            }
            '{' => {
                chars.next();
                tokens.push((start, Token::LBrace));
            }
            '}' => {
                chars.next();
                tokens.push((start, Token::RBrace));
            }
            '>' => return Err(malformed(start, "unexpected '>'")),
            _ => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_word_break(c) {
                        break;
                    }
                    if c == '.' {
                        // A dot belongs to the word only when more name follows.
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        if !lookahead.peek().is_some_and(|&(_, next)| is_name_char(next)) {
                            break;
                        }
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push((start, Token::Word(word)));
            }
        }
    }
    Ok(tokens)
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser<'t> {
    tokens: &'t [(usize, Token)],
    position: usize,
    end: usize,
    prefixes: BTreeMap<String, String>,
    blank_count: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(_, token)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position).map(|(_, token)| token);
        self.position = self.position.saturating_add(1);
        token
    }

    fn parse(&mut self) -> Result<Vec<TriplePattern>, QueryError> {
        self.parse_prefixes()?;

        let braced = matches!(self.peek(), Some(Token::LBrace));
        if braced {
            self.next();
        }

        let mut triples = Vec::new();
        while !matches!(self.peek(), None | Some(Token::RBrace)) {
            self.parse_triples(&mut triples)?;
            match self.peek() {
                Some(Token::Dot) => {
                    self.next();
                }
                None | Some(Token::RBrace) => {}
                Some(_) => return Err(malformed(self.offset(), "expected '.'")),
            }
        }

        if braced {
            match self.next() {
                Some(Token::RBrace) => {}
                _ => return Err(malformed(self.offset(), "expected '}'")),
            }
        }
        if self.peek().is_some() {
            return Err(malformed(self.offset(), "unexpected trailing input"));
        }
        Ok(triples)
    }

    fn parse_prefixes(&mut self) -> Result<(), QueryError> {
        while let Some(Token::Word(word)) = self.peek() {
            if !word.eq_ignore_ascii_case("PREFIX") {
                break;
            }
            self.next();
            let offset = self.offset();
            let name = match self.next() {
                Some(Token::Word(name)) if name.ends_with(':') => {
                    name.trim_end_matches(':').to_string()
                }
                _ => return Err(malformed(offset, "expected prefix name")),
            };
            let offset = self.offset();
            let iri = match self.next() {
                Some(Token::Iri(iri)) => iri.clone(),
                _ => return Err(malformed(offset, "expected prefix IRI")),
            };
            self.prefixes.insert(name, iri);
        }
        Ok(())
    }

    fn parse_triples(&mut self, out: &mut Vec<TriplePattern>) -> Result<(), QueryError> {
        let subject = self.parse_slot()?;
        loop {
            let predicate = self.parse_verb()?;
            loop {
                let object = self.parse_slot()?;
                out.push(TriplePattern {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    object,
                });
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.next();
                } else {
                    break;
                }
            }
            if !matches!(self.peek(), Some(Token::Semicolon)) {
                return Ok(());
            }
            self.next();
            if matches!(self.peek(), None | Some(Token::Dot) | Some(Token::RBrace)) {
                return Ok(());
            }
        }
    }

    fn parse_verb(&mut self) -> Result<Slot, QueryError> {
        if matches!(self.peek(), Some(Token::Word(word)) if word == "a") {
            self.next();
            return Ok(Slot::Term(Term::iri(RDF_TYPE)));
        }
        self.parse_slot()
    }

    fn parse_slot(&mut self) -> Result<Slot, QueryError> {
        let offset = self.offset();
        let token = self
            .next()
            .cloned()
            .ok_or_else(|| malformed(offset, "unexpected end of pattern"))?;
        match token {
            Token::Var(name) => Ok(Slot::Var(name)),
            Token::Iri(iri) => Ok(Slot::Term(Term::Iri(iri))),
            Token::Word(word) => self.parse_word(offset, &word),
            Token::Str(value) => self.parse_literal(value),
            _ => Err(malformed(offset, "expected a term")),
        }
    }

    fn parse_word(&mut self, offset: usize, word: &str) -> Result<Slot, QueryError> {
        if let Some(label) = word.strip_prefix(HIDDEN_VAR) {
            if label.is_empty() {
                self.blank_count = self.blank_count.saturating_add(1);
                return Ok(Slot::Var(format!("{HIDDEN_VAR}anon{}", self.blank_count)));
            }
            return Ok(Slot::Var(format!("{HIDDEN_VAR}{label}")));
        }
        if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Slot::Term(Term::typed(
                word,
                crate::primitives::XSD_INTEGER,
            )));
        }
        if word == "true" || word == "false" {
            return Ok(Slot::Term(Term::typed(
                word,
                "http://www.w3.org/2001/XMLSchema#boolean",
            )));
        }
        match word.split_once(':') {
            Some((prefix, local)) => Ok(Slot::Term(Term::Iri(self.expand(prefix, local)?))),
            None => Err(malformed(offset, format!("unexpected word '{word}'"))),
        }
    }

    fn parse_literal(&mut self, value: String) -> Result<Slot, QueryError> {
        match self.peek() {
            Some(Token::LangTag(tag)) => {
                let tag = tag.clone();
                self.next();
                Ok(Slot::Term(Term::lang(value, tag)))
            }
            Some(Token::DoubleCaret) => {
                self.next();
                let offset = self.offset();
                let datatype = match self.next().cloned() {
                    Some(Token::Iri(iri)) => iri,
                    Some(Token::Word(word)) => match word.split_once(':') {
                        Some((prefix, local)) => self.expand(prefix, local)?,
                        None => return Err(malformed(offset, "expected datatype")),
                    },
                    _ => return Err(malformed(offset, "expected datatype")),
                };
                Ok(Slot::Term(Term::typed(value, datatype)))
            }
            _ => Ok(Slot::Term(Term::literal(value))),
        }
    }

    fn expand(&self, prefix: &str, local: &str) -> Result<String, QueryError> {
        self.prefixes
            .get(prefix)
            .map(|namespace| format!("{namespace}{local}"))
            .ok_or_else(|| QueryError::UnknownPrefix(prefix.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
