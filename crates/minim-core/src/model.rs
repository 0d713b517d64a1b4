//! # Constraint Model Store
//!
//! Read-only checklists, models, requirements and rules built from one or
//! more constraint graph fragments.
//!
//! ## Loading
//!
//! Every fragment is read through the [`QueryCapability`] with fixed
//! vocabulary patterns. Nothing else touches the graphs. Rule kinds are
//! decided here, once: a rule that is not exactly one of Exists, ForEach or
//! Command is kept as [`RuleRef::Rejected`] so the requirement using it can
//! be reported as a failure instead of aborting the load.
//!
//! ## Ordering
//!
//! Models that share a name across fragments are merged by concatenation in
//! fragment load order. Within one fragment requirements are stably sorted by
//! `seq` (string order); ties keep query order, MUST before SHOULD before MAY.

use crate::fingerprint::fingerprint;
use crate::graph::Graph;
use crate::primitives::{
    COMMAND, DEFAULT_TARGET_TEMPLATE, EXISTS, FOR_PURPOSE, FOR_TARGET_TEMPLATE,
    HAS_MAY_REQUIREMENT, HAS_MUST_REQUIREMENT, HAS_SHOULD_REQUIREMENT, IS_DERIVED_BY,
    IS_LIVE_TEMPLATE, MAX, MIN, MINIM_MODEL, QUERY, RDF_TYPE, RESPONSE, SEQ, SHOW, SHOW_FAIL,
    SHOW_MISS, SHOW_PASS, SPARQL_QUERY, TO_MODEL,
};
use crate::query::{Pattern, QueryCapability};
use crate::render::UriTemplate;
use crate::{Bindings, ConfigurationError, Level, QueryError, RuleDefinitionError, Term};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// =============================================================================
// RULES
// =============================================================================

/// Optional message templates attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Messages {
    /// Description of the requirement (`minim:show`).
    pub show: Option<String>,
    /// Shown on PASS (`minim:showpass`).
    pub pass: Option<String>,
    /// Shown on FAIL (`minim:showfail`).
    pub fail: Option<String>,
    /// Shown when a ForEach rule matched nothing (`minim:showmiss`).
    pub no_match: Option<String>,
}

/// Parameters of a ForEach rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForEachRule {
    /// Outer pattern producing one binding per resource.
    pub pattern: Pattern,
    /// Sub-pattern each outer binding must satisfy.
    pub exists: Option<Pattern>,
    /// URI each outer binding must make reachable.
    pub is_live: Option<UriTemplate>,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl ForEachRule {
    /// Whether `count` outer bindings lie within `[min, max]`.
    #[must_use]
    pub fn admits(&self, count: u64) -> bool {
        self.min.unwrap_or(0) <= count && self.max.is_none_or(|max| count <= max)
    }

    /// Whether zero matches is a failure.
    #[must_use]
    pub fn requires_match(&self) -> bool {
        self.min.is_some_and(|min| min > 0)
    }
}

/// The closed set of rule kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Passes if the pattern has at least one solution.
    Exists { pattern: Pattern },
    /// Checks every solution of an outer pattern.
    ForEach(ForEachRule),
    /// Runs a command and matches its output against `response`.
    Command { command: String, response: String },
}

impl RuleKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            RuleKind::Exists { .. } => "exists",
            RuleKind::ForEach(_) => "foreach",
            RuleKind::Command { .. } => "command",
        }
    }
}

/// A validated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// String form of the rule node.
    pub name: String,
    pub kind: RuleKind,
    pub messages: Messages,
}

/// The rule a requirement is derived by, or why it has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleRef {
    Rule(Arc<Rule>),
    Rejected {
        rule: String,
        reason: RuleDefinitionError,
    },
}

impl RuleRef {
    /// Name of the referenced rule, valid or not.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            RuleRef::Rule(rule) => &rule.name,
            RuleRef::Rejected { rule, .. } => rule,
        }
    }

    #[must_use]
    pub fn rule(&self) -> Option<&Rule> {
        match self {
            RuleRef::Rule(rule) => Some(rule),
            RuleRef::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub fn messages(&self) -> Option<&Messages> {
        self.rule().map(|rule| &rule.messages)
    }
}

// =============================================================================
// CHECKLISTS, MODELS, REQUIREMENTS
// =============================================================================

/// One item of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// String form of the requirement node.
    pub id: String,
    /// Name of the owning model.
    pub model: String,
    /// Sort key; empty when the requirement has no `minim:seq`.
    pub seq: String,
    pub level: Level,
    pub rule: RuleRef,
}

/// A named, ordered sequence of requirements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    pub name: String,
    pub items: Vec<Requirement>,
}

/// Maps a (target template, purpose) pair to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    pub id: String,
    pub target_template: String,
    pub purpose: String,
    pub model: String,
}

/// Every checklist, model and rule of a constraint graph.
#[derive(Debug, Clone, Default)]
pub struct ConstraintModel {
    /// Checklists in load order.
    checklists: Vec<Checklist>,

    /// Model name -> model.
    models: BTreeMap<String, Model>,

    /// Rule node -> resolved rule, shared by every requirement using it.
    rules: BTreeMap<Term, RuleRef>,

    fingerprint: String,
}

impl ConstraintModel {
    /// Build the store from a single constraint graph.
    pub fn build(graph: &Graph, query: &dyn QueryCapability) -> Result<Self, ConfigurationError> {
        Self::build_fragments(std::slice::from_ref(graph), query)
    }

    /// Build the store from constraint graph fragments in load order.
    pub fn build_fragments(
        fragments: &[Graph],
        query: &dyn QueryCapability,
    ) -> Result<Self, ConfigurationError> {
        let loader = Loader { fragments, query };
        let mut store = ConstraintModel {
            fingerprint: fingerprint(fragments),
            ..Self::default()
        };

        for graph in fragments {
            store.load_checklists(&loader, graph)?;

            for row in loader.select(graph, &format!("?model <{RDF_TYPE}> <{MINIM_MODEL}>"))? {
                if let Some(model) = row.get("model") {
                    store.model_entry(model);
                }
            }

            let mut fragment_items: Vec<(Term, Requirement)> = Vec::new();
            for (level, predicate) in [
                (Level::Must, HAS_MUST_REQUIREMENT),
                (Level::Should, HAS_SHOULD_REQUIREMENT),
                (Level::May, HAS_MAY_REQUIREMENT),
            ] {
                for row in loader.select(graph, &format!("?model <{predicate}> ?item"))? {
                    let (Some(model), Some(item)) = (row.get("model"), row.get("item")) else {
                        continue;
                    };
                    let requirement = store.requirement(&loader, model, item, level)?;
                    fragment_items.push((model.clone(), requirement));
                }
            }

            // Stable: equal seq keeps query order.
            fragment_items.sort_by(|(_, a), (_, b)| a.seq.cmp(&b.seq));
            for (model, requirement) in fragment_items {
                store.model_entry(&model).items.push(requirement);
            }
        }

        Ok(store)
    }

    fn load_checklists(&mut self, loader: &Loader<'_>, graph: &Graph) -> Result<(), QueryError> {
        let pattern = format!("?checklist <{FOR_PURPOSE}> ?purpose . ?checklist <{TO_MODEL}> ?model");
        for row in loader.select(graph, &pattern)? {
            let (Some(checklist), Some(purpose), Some(model)) =
                (row.get("checklist"), row.get("purpose"), row.get("model"))
            else {
                continue;
            };
            let target_template = loader
                .first(checklist, FOR_TARGET_TEMPLATE)?
                .map_or_else(|| DEFAULT_TARGET_TEMPLATE.to_string(), |t| t.to_string());
            self.checklists.push(Checklist {
                id: checklist.to_string(),
                target_template,
                purpose: purpose.to_string(),
                model: model.to_string(),
            });
        }
        Ok(())
    }

    fn model_entry(&mut self, name: &Term) -> &mut Model {
        let name = name.to_string();
        self.models.entry(name.clone()).or_insert_with(|| Model {
            name,
            items: Vec::new(),
        })
    }

    fn requirement(
        &mut self,
        loader: &Loader<'_>,
        model: &Term,
        item: &Term,
        level: Level,
    ) -> Result<Requirement, QueryError> {
        let seq = loader
            .first(item, SEQ)?
            .map(|term| term.to_string())
            .unwrap_or_default();

        let rule = match loader.first(item, IS_DERIVED_BY)? {
            Some(node) => match self.rules.get(&node) {
                Some(rule) => rule.clone(),
                None => {
                    let name = node.to_string();
                    let rule = match define_rule(loader, &node) {
                        Ok(rule) => RuleRef::Rule(Arc::new(rule)),
                        Err(QueryOrDefinition::Definition(reason)) => {
                            RuleRef::Rejected { rule: name, reason }
                        }
                        Err(QueryOrDefinition::Query(e)) => return Err(e),
                    };
                    self.rules.insert(node, rule.clone());
                    rule
                }
            },
            None => RuleRef::Rejected {
                rule: item.to_string(),
                reason: RuleDefinitionError::MissingRule,
            },
        };

        Ok(Requirement {
            id: item.to_string(),
            model: model.to_string(),
            seq,
            level,
            rule,
        })
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// The model of the first checklist matching `target_template` and `purpose`.
    pub fn resolve_checklist(
        &self,
        target_template: &str,
        purpose: &str,
    ) -> Result<&Model, ConfigurationError> {
        let checklist = self.find_checklist(target_template, purpose).ok_or_else(|| {
            ConfigurationError::NoChecklist {
                target: target_template.to_string(),
                purpose: purpose.to_string(),
            }
        })?;
        self.models
            .get(&checklist.model)
            .ok_or_else(|| ConfigurationError::DanglingModel {
                checklist: checklist.id.clone(),
                model: checklist.model.clone(),
            })
    }

    /// The first checklist (load order) for `target_template` and `purpose`.
    #[must_use]
    pub fn find_checklist(&self, target_template: &str, purpose: &str) -> Option<&Checklist> {
        self.checklists
            .iter()
            .find(|c| c.purpose == purpose && c.target_template == target_template)
    }

    /// Requirements of a model in evaluation order.
    #[must_use]
    pub fn items_of<'a>(&self, model: &'a Model) -> &'a [Requirement] {
        &model.items
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    #[must_use]
    pub fn checklists(&self) -> &[Checklist] {
        &self.checklists
    }

    /// Rules rejected at load time, with their reasons. Requirements without a
    /// rule are not listed.
    pub fn rejected_rules(&self) -> impl Iterator<Item = (&str, &RuleDefinitionError)> {
        self.rules.values().filter_map(|rule| match rule {
            RuleRef::Rejected { rule, reason } => Some((rule.as_str(), reason)),
            RuleRef::Rule(_) => None,
        })
    }

    /// Distinct model names referenced by checklists but never defined.
    #[must_use]
    pub fn dangling_models(&self) -> BTreeSet<&str> {
        self.checklists
            .iter()
            .filter(|c| !self.models.contains_key(&c.model))
            .map(|c| c.model.as_str())
            .collect()
    }

    /// Fingerprint of the fragments this store was built from.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Vocabulary lookups through the query capability.
struct Loader<'a> {
    fragments: &'a [Graph],
    query: &'a dyn QueryCapability,
}

enum QueryOrDefinition {
    Query(QueryError),
    Definition(RuleDefinitionError),
}

impl From<QueryError> for QueryOrDefinition {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

impl From<RuleDefinitionError> for QueryOrDefinition {
    fn from(e: RuleDefinitionError) -> Self {
        Self::Definition(e)
    }
}

impl Loader<'_> {
    fn select(&self, graph: &Graph, pattern: &str) -> Result<Vec<Bindings>, QueryError> {
        self.query
            .select(graph, &Pattern::new(pattern), &Bindings::new())
    }

    /// First value of `subject predicate ?value` across all fragments.
    ///
    /// Resources may be described in a different fragment than the one that
    /// references them.
    fn first(&self, subject: &Term, predicate: &str) -> Result<Option<Term>, QueryError> {
        let pattern = Pattern::new(format!("?subject <{predicate}> ?value"));
        let initial = Bindings::new().with("subject", subject.clone());
        for graph in self.fragments {
            let rows = self.query.select(graph, &pattern, &initial)?;
            if let Some(value) = rows.iter().find_map(|row| row.get("value").cloned()) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn text(&self, subject: &Term, predicate: &str) -> Result<Option<String>, QueryError> {
        Ok(self.first(subject, predicate)?.map(|term| term.to_string()))
    }

    /// A pattern given either as a literal or as a node carrying `minim:sparql_query`.
    fn pattern(
        &self,
        subject: &Term,
        predicate: &str,
        property: &'static str,
    ) -> Result<Option<Pattern>, QueryOrDefinition> {
        let Some(value) = self.first(subject, predicate)? else {
            return Ok(None);
        };
        if let Some(text) = value.as_literal() {
            return Ok(Some(Pattern::new(text)));
        }
        match self.first(&value, SPARQL_QUERY)? {
            Some(Term::Literal(text)) => Ok(Some(Pattern::new(text.lexical))),
            _ => Err(RuleDefinitionError::MissingPattern(property).into()),
        }
    }

    fn bound(
        &self,
        subject: &Term,
        predicate: &str,
        property: &'static str,
    ) -> Result<Option<u64>, QueryOrDefinition> {
        match self.first(subject, predicate)? {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                RuleDefinitionError::BadBound {
                    property,
                    value: value.to_string(),
                }
                .into()
            }),
        }
    }
}

/// Decide the kind of the rule at `node`.
fn define_rule(loader: &Loader<'_>, node: &Term) -> Result<Rule, QueryOrDefinition> {
    let query = loader.pattern(node, QUERY, "query")?;
    let exists = loader.pattern(node, EXISTS, "exists")?;
    let command = loader.text(node, COMMAND)?;
    let is_live = loader.text(node, IS_LIVE_TEMPLATE)?;
    let min = loader.bound(node, MIN, "min")?;
    let max = loader.bound(node, MAX, "max")?;

    let conflict = |first: &'static str, present: &[(&'static str, bool)]| {
        present
            .iter()
            .find(|(_, is_present)| *is_present)
            .map(|(second, _)| RuleDefinitionError::ConflictingProperties {
                first,
                second: *second,
            })
    };

    let kind = if let Some(command) = command {
        if let Some(e) = conflict(
            "command",
            &[
                ("query", query.is_some()),
                ("exists", exists.is_some()),
                ("isLiveTemplate", is_live.is_some()),
                ("min", min.is_some()),
                ("max", max.is_some()),
            ],
        ) {
            return Err(e.into());
        }
        let response = loader
            .text(node, RESPONSE)?
            .ok_or(RuleDefinitionError::MissingResponse)?;
        RuleKind::Command { command, response }
    } else if let Some(pattern) = query {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(RuleDefinitionError::EmptyRange { min, max }.into());
        }
        let is_live = is_live
            .map(|text| UriTemplate::parse(&text))
            .transpose()
            .map_err(RuleDefinitionError::BadTemplate)?;
        RuleKind::ForEach(ForEachRule {
            pattern,
            exists,
            is_live,
            min,
            max,
        })
    } else if let Some(pattern) = exists {
        if let Some(e) = conflict(
            "exists",
            &[
                ("isLiveTemplate", is_live.is_some()),
                ("min", min.is_some()),
                ("max", max.is_some()),
            ],
        ) {
            return Err(e.into());
        }
        RuleKind::Exists { pattern }
    } else {
        return Err(RuleDefinitionError::NoKind.into());
    };

    Ok(Rule {
        name: node.to_string(),
        kind,
        messages: Messages {
            show: loader.text(node, SHOW)?,
            pass: loader.text(node, SHOW_PASS)?,
            fail: loader.text(node, SHOW_FAIL)?,
            no_match: loader.text(node, SHOW_MISS)?,
        },
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::MINIM_NS;
    use crate::query::PatternMatcher;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{local}"))
    }

    fn minim(local: &str) -> Term {
        Term::iri(format!("{MINIM_NS}{local}"))
    }

    fn checklist(graph: &mut Graph, name: &str, purpose: &str, model: &str) {
        graph.insert(ex(name), minim("forPurpose"), Term::literal(purpose));
        graph.insert(ex(name), minim("toModel"), ex(model));
    }

    fn requirement(graph: &mut Graph, model: &str, level: &str, item: &str, seq: &str, rule: &str) {
        graph.insert(ex(model), minim(&format!("has{level}Requirement")), ex(item));
        graph.insert(ex(item), minim("seq"), Term::literal(seq));
        graph.insert(ex(item), minim("isDerivedBy"), ex(rule));
    }

    fn build(graph: &Graph) -> ConstraintModel {
        ConstraintModel::build(graph, &PatternMatcher::new()).expect("build")
    }

    fn sample() -> Graph {
        let mut graph = Graph::new();
        checklist(&mut graph, "runnable", "Runnable", "model");
        requirement(&mut graph, "model", "Must", "item2", "02", "exists_rule");
        requirement(&mut graph, "model", "Should", "item1", "01", "foreach_rule");
        graph.insert(ex("exists_rule"), minim("exists"), Term::literal("?x ?p ?o"));
        graph.insert(ex("foreach_rule"), minim("query"), Term::literal("?r ?p ?f"));
        graph.insert(ex("foreach_rule"), minim("min"), Term::integer(1));
        graph.insert(ex("foreach_rule"), minim("showmiss"), Term::literal("nothing"));
        graph
    }

    #[test]
    fn checklist_resolves_with_default_template() {
        let store = build(&sample());
        let model = store
            .resolve_checklist(DEFAULT_TARGET_TEMPLATE, "Runnable")
            .expect("resolve");
        assert_eq!(model.name, "http://example.org/model");
    }

    #[test]
    fn unknown_purpose_is_no_checklist() {
        let store = build(&sample());
        assert!(matches!(
            store.resolve_checklist(DEFAULT_TARGET_TEMPLATE, "Other"),
            Err(ConfigurationError::NoChecklist { .. })
        ));
        assert!(matches!(
            store.resolve_checklist("{+targetro}/other", "Runnable"),
            Err(ConfigurationError::NoChecklist { .. })
        ));
    }

    #[test]
    fn items_sorted_by_seq() {
        let store = build(&sample());
        let model = store
            .resolve_checklist(DEFAULT_TARGET_TEMPLATE, "Runnable")
            .expect("resolve");
        let seqs: Vec<_> = store.items_of(model).iter().map(|i| i.seq.as_str()).collect();
        assert_eq!(seqs, vec!["01", "02"]);
        assert_eq!(store.items_of(model)[0].level, Level::Should);
    }

    #[test]
    fn rule_kinds_are_decided_at_load() {
        let store = build(&sample());
        let model = store.model("http://example.org/model").expect("model");
        let kinds: Vec<_> = model
            .items
            .iter()
            .filter_map(|item| item.rule.rule().map(|rule| rule.kind.name()))
            .collect();
        assert_eq!(kinds, vec!["foreach", "exists"]);

        let rule = model.items[0].rule.rule().expect("foreach rule");
        assert!(matches!(
            &rule.kind,
            RuleKind::ForEach(foreach) if foreach.min == Some(1) && foreach.requires_match()
        ));
        assert_eq!(rule.messages.no_match.as_deref(), Some("nothing"));
    }

    #[test]
    fn dangling_model_is_reported() {
        let mut graph = Graph::new();
        checklist(&mut graph, "c", "Runnable", "nowhere");
        let store = build(&graph);
        assert!(matches!(
            store.resolve_checklist(DEFAULT_TARGET_TEMPLATE, "Runnable"),
            Err(ConfigurationError::DanglingModel { .. })
        ));
        assert!(store.dangling_models().contains("http://example.org/nowhere"));
    }

    #[test]
    fn typed_model_without_requirements_is_not_dangling() {
        let mut graph = Graph::new();
        checklist(&mut graph, "c", "Runnable", "empty");
        graph.insert(ex("empty"), Term::iri(RDF_TYPE), Term::iri(MINIM_MODEL));
        let store = build(&graph);
        let model = store
            .resolve_checklist(DEFAULT_TARGET_TEMPLATE, "Runnable")
            .expect("resolve");
        assert!(model.items.is_empty());
    }

    #[test]
    fn explicit_target_template_is_matched() {
        let mut graph = sample();
        graph.insert(
            ex("runnable"),
            minim("forTargetTemplate"),
            Term::literal("{+targetro}/workflow"),
        );
        let store = build(&graph);
        assert!(store.resolve_checklist("{+targetro}/workflow", "Runnable").is_ok());
        assert!(store.resolve_checklist(DEFAULT_TARGET_TEMPLATE, "Runnable").is_err());
    }

    #[test]
    fn conflicting_rule_is_rejected() {
        let mut graph = Graph::new();
        checklist(&mut graph, "c", "p", "m");
        requirement(&mut graph, "m", "Must", "i", "1", "bad");
        graph.insert(ex("bad"), minim("command"), Term::literal("python --version"));
        graph.insert(ex("bad"), minim("query"), Term::literal("?a ?b ?c"));
        let store = build(&graph);

        let rejected: Vec<_> = store.rejected_rules().collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(
            rejected[0].1,
            &RuleDefinitionError::ConflictingProperties {
                first: "command",
                second: "query"
            }
        );
    }

    #[test]
    fn rule_without_kind_is_rejected() {
        let mut graph = Graph::new();
        requirement(&mut graph, "m", "Must", "i", "1", "empty_rule");
        graph.insert(ex("empty_rule"), minim("show"), Term::literal("nothing here"));
        let store = build(&graph);
        let model = store.model("http://example.org/m").expect("model");
        assert!(matches!(
            &model.items[0].rule,
            RuleRef::Rejected {
                reason: RuleDefinitionError::NoKind,
                ..
            }
        ));
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut graph = Graph::new();
        requirement(&mut graph, "m", "Must", "i", "1", "r");
        graph.insert(ex("r"), minim("query"), Term::literal("?a ?b ?c"));
        graph.insert(ex("r"), minim("min"), Term::integer(3));
        graph.insert(ex("r"), minim("max"), Term::integer(1));
        let store = build(&graph);
        let model = store.model("http://example.org/m").expect("model");
        assert_eq!(
            model.items[0].rule,
            RuleRef::Rejected {
                rule: "http://example.org/r".to_string(),
                reason: RuleDefinitionError::EmptyRange { min: 3, max: 1 },
            }
        );
    }

    #[test]
    fn bad_bound_is_rejected() {
        let mut graph = Graph::new();
        requirement(&mut graph, "m", "Must", "i", "1", "r");
        graph.insert(ex("r"), minim("query"), Term::literal("?a ?b ?c"));
        graph.insert(ex("r"), minim("min"), Term::literal("several"));
        let store = build(&graph);
        assert!(matches!(
            store.rejected_rules().next(),
            Some((_, RuleDefinitionError::BadBound { property: "min", .. }))
        ));
    }

    #[test]
    fn item_without_rule_is_rejected() {
        let mut graph = Graph::new();
        graph.insert(ex("m"), minim("hasMustRequirement"), ex("orphan"));
        let store = build(&graph);
        let model = store.model("http://example.org/m").expect("model");
        assert!(matches!(
            model.items[0].rule,
            RuleRef::Rejected {
                reason: RuleDefinitionError::MissingRule,
                ..
            }
        ));
        assert_eq!(model.items[0].seq, "");
    }

    #[test]
    fn pattern_node_with_sparql_query() {
        let mut graph = Graph::new();
        requirement(&mut graph, "m", "Must", "i", "1", "r");
        graph.insert(ex("r"), minim("exists"), ex("q"));
        graph.insert(ex("q"), minim("sparql_query"), Term::literal("?s ?p ?o"));
        let store = build(&graph);
        let model = store.model("http://example.org/m").expect("model");
        assert!(matches!(
            model.items[0].rule.rule().map(|r| &r.kind),
            Some(RuleKind::Exists { pattern }) if pattern.as_str() == "?s ?p ?o"
        ));
    }

    #[test]
    fn fragments_merge_by_concatenation() {
        let mut first = Graph::new();
        checklist(&mut first, "c", "p", "m");
        requirement(&mut first, "m", "Must", "a", "9", "r");
        let mut second = Graph::new();
        requirement(&mut second, "m", "May", "b", "1", "r");
        second.insert(ex("r"), minim("exists"), Term::literal("?s ?p ?o"));

        let store = ConstraintModel::build_fragments(&[first, second], &PatternMatcher::new())
            .expect("build");
        let model = store.resolve_checklist(DEFAULT_TARGET_TEMPLATE, "p").expect("resolve");
        let ids: Vec<_> = model.items.iter().map(|i| i.id.as_str()).collect();
        // Later fragment appends even though its seq sorts first.
        assert_eq!(ids, vec!["http://example.org/a", "http://example.org/b"]);
        // Rule described only in the second fragment still resolves.
        assert!(model.items[0].rule.rule().is_some());
    }

    #[test]
    fn equal_seq_keeps_level_order() {
        let mut graph = Graph::new();
        requirement(&mut graph, "m", "May", "c", "1", "r");
        requirement(&mut graph, "m", "Must", "a", "1", "r");
        requirement(&mut graph, "m", "Should", "b", "1", "r");
        graph.insert(ex("r"), minim("exists"), Term::literal("?s ?p ?o"));
        let store = build(&graph);
        let levels: Vec<_> = store
            .model("http://example.org/m")
            .expect("model")
            .items
            .iter()
            .map(|i| i.level)
            .collect();
        assert_eq!(levels, vec![Level::Must, Level::Should, Level::May]);
    }

    #[test]
    fn fingerprint_is_recorded() {
        let graph = sample();
        let store = build(&graph);
        assert_eq!(store.fingerprint(), fingerprint(std::slice::from_ref(&graph)));
    }
}
