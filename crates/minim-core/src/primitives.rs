//! # Vocabulary and Limits
//!
//! Fixed IRIs of the Minim checklist vocabulary, the standard prefix table
//! used by the reference pattern matcher, and computational bounds.
//!
//! These are compiled into the binary and are immutable at runtime.

/// Namespace of the Minim checklist vocabulary.
pub const MINIM_NS: &str = "http://purl.org/minim/minim#";

// =============================================================================
// CHECKLIST VOCABULARY
// =============================================================================

pub const MINIM_MODEL: &str = "http://purl.org/minim/minim#Model";

pub const FOR_TARGET_TEMPLATE: &str = "http://purl.org/minim/minim#forTargetTemplate";
pub const FOR_PURPOSE: &str = "http://purl.org/minim/minim#forPurpose";
pub const TO_MODEL: &str = "http://purl.org/minim/minim#toModel";

pub const HAS_MUST_REQUIREMENT: &str = "http://purl.org/minim/minim#hasMustRequirement";
pub const HAS_SHOULD_REQUIREMENT: &str = "http://purl.org/minim/minim#hasShouldRequirement";
pub const HAS_MAY_REQUIREMENT: &str = "http://purl.org/minim/minim#hasMayRequirement";

pub const SEQ: &str = "http://purl.org/minim/minim#seq";
pub const IS_DERIVED_BY: &str = "http://purl.org/minim/minim#isDerivedBy";

// =============================================================================
// RULE VOCABULARY
// =============================================================================

pub const QUERY: &str = "http://purl.org/minim/minim#query";
pub const EXISTS: &str = "http://purl.org/minim/minim#exists";
pub const COMMAND: &str = "http://purl.org/minim/minim#command";
pub const RESPONSE: &str = "http://purl.org/minim/minim#response";
pub const SPARQL_QUERY: &str = "http://purl.org/minim/minim#sparql_query";
pub const MIN: &str = "http://purl.org/minim/minim#min";
pub const MAX: &str = "http://purl.org/minim/minim#max";
pub const IS_LIVE_TEMPLATE: &str = "http://purl.org/minim/minim#isLiveTemplate";
pub const SHOW: &str = "http://purl.org/minim/minim#show";
pub const SHOW_PASS: &str = "http://purl.org/minim/minim#showpass";
pub const SHOW_FAIL: &str = "http://purl.org/minim/minim#showfail";
pub const SHOW_MISS: &str = "http://purl.org/minim/minim#showmiss";

// =============================================================================
// GENERAL VOCABULARY
// =============================================================================

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// Prefixes every pattern may use without declaring them.
pub const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dct", "http://purl.org/dc/terms/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("ore", "http://www.openarchives.org/ore/terms/"),
    ("ao", "http://purl.org/ao/"),
    ("ro", "http://purl.org/wf4ever/ro#"),
    ("wfprov", "http://purl.org/wf4ever/wfprov#"),
    ("wfdesc", "http://purl.org/wf4ever/wfdesc#"),
    ("minim", MINIM_NS),
];

// =============================================================================
// STANDARD BINDINGS
// =============================================================================

/// Variable bound to the artifact (research object) URI.
pub const TARGET_RO_VAR: &str = "targetro";

/// Variable bound to the expanded target template.
pub const TARGET_URI_VAR: &str = "targeturi";

/// Target template used by checklists that do not declare one.
pub const DEFAULT_TARGET_TEMPLATE: &str = "{+targetro}";

// =============================================================================
// COMPUTATIONAL BOUNDS
// =============================================================================

/// Maximum number of triple patterns in one pattern.
pub const MAX_PATTERN_TRIPLES: usize = 64;

/// Maximum number of result rows one query may produce.
pub const MAX_RESULT_ROWS: usize = 100_000;

/// Maximum length of pattern text accepted by the matcher (64KB).
pub const MAX_PATTERN_LENGTH: usize = 65536;
