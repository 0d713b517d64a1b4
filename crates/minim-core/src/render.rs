//! # Render Module
//!
//! Message and URI template rendering.
//!
//! - Message templates use `%(name)s` placeholders; `%%` is a literal `%`
//! - URI templates use `{+name}` (reserved) and `{name}` (simple) expansion
//! - Rendering never panics; failures are reported as [`RenderError`]

use crate::{Bindings, RenderError};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// MESSAGE TEMPLATES
// =============================================================================

/// Fill a message template from bindings.
///
/// Every `%(name)s` is replaced by the string form of `bindings[name]`.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0usize;

    while let Some(index) = rest.find('%') {
        out.push_str(&rest[..index]);
        let at = offset.saturating_add(index);
        let tail = &rest[index..];

        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            offset = at.saturating_add(2);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%(") {
            let close = after.find(")s").ok_or(RenderError::Malformed(at))?;
            let name = &after[..close];
            if name.is_empty() || name.contains('(') {
                return Err(RenderError::Malformed(at));
            }
            let term = bindings
                .get(name)
                .ok_or_else(|| RenderError::MissingBinding(name.to_string()))?;
            out.push_str(&term.to_string());
            let consumed = close.saturating_add(4);
            offset = at.saturating_add(consumed);
            rest = &tail[consumed..];
        } else {
            // A lone '%' is kept as text.
            out.push('%');
            offset = at.saturating_add(1);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Render a template, falling back to the raw template plus a diagnostic.
#[must_use]
pub fn render_or_diagnostic(template: &str, bindings: &Bindings) -> String {
    match render(template, bindings) {
        Ok(text) => text,
        Err(e) => format!("{} [render error: {}]", template, e),
    }
}

// =============================================================================
// URI TEMPLATES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Operator {
    /// `{var}`: percent-encode everything outside the unreserved set.
    Simple,
    /// `{+var}`: reserved characters pass through.
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Part {
    Text(String),
    Expression {
        operator: Operator,
        names: Vec<String>,
    },
}

/// A parsed URI template (`{+var}` / `{var}` expressions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a URI template.
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let mut parts = Vec::new();
        let mut rest = source;
        let mut offset = 0usize;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                parts.push(Part::Text(rest[..open].to_string()));
            }
            let at = offset.saturating_add(open);
            let after = &rest[open.saturating_add(1)..];
            let close = after.find('}').ok_or(RenderError::Malformed(at))?;
            let body = &after[..close];

            let (operator, list) = match body.strip_prefix('+') {
                Some(list) => (Operator::Reserved, list),
                None => (Operator::Simple, body),
            };
            let names: Vec<String> = list.split(',').map(|n| n.trim().to_string()).collect();
            if names.iter().any(|n| n.is_empty() || !n.chars().all(is_varchar)) {
                return Err(RenderError::Malformed(at));
            }
            parts.push(Part::Expression { operator, names });

            let consumed = open.saturating_add(close).saturating_add(2);
            offset = offset.saturating_add(consumed);
            rest = &rest[consumed..];
        }
        if rest.contains('}') {
            return Err(RenderError::Malformed(offset));
        }
        if !rest.is_empty() {
            parts.push(Part::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    /// The template text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all variables referenced by the template.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Expression { names, .. } => Some(names),
                Part::Text(_) => None,
            })
            .flatten()
            .map(String::as_str)
    }

    /// Expand the template. Every referenced variable must be bound.
    pub fn expand(&self, bindings: &Bindings) -> Result<String, RenderError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Expression { operator, names } => {
                    let mut first = true;
                    for name in names {
                        let term = bindings
                            .get(name)
                            .ok_or_else(|| RenderError::MissingBinding(name.clone()))?;
                        if !first {
                            out.push(',');
                        }
                        first = false;
                        encode_into(&term.to_string(), *operator, &mut out);
                    }
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_varchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

fn is_reserved(byte: u8) -> bool {
    matches!(
        byte,
        b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@' | b'!' | b'$' | b'&' | b'\''
            | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

fn encode_into(value: &str, operator: Operator, out: &mut String) {
    let bytes = value.as_bytes();
    let mut index = 0usize;
    while index < bytes.len() {
        let byte = bytes[index];
        let keep = is_unreserved(byte) || (operator == Operator::Reserved && is_reserved(byte));
        // Reserved expansion keeps existing pct-encoded triplets intact.
        let triplet = operator == Operator::Reserved
            && byte == b'%'
            && bytes.get(index.saturating_add(1)).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(index.saturating_add(2)).is_some_and(u8::is_ascii_hexdigit);
        if keep || triplet {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
        index = index.saturating_add(1);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Term;

    fn bindings() -> Bindings {
        Bindings::new()
            .with("file", Term::iri("http://example.org/ro/data file.csv"))
            .with("label", Term::literal("Data"))
    }

    #[test]
    fn render_replaces_placeholders() {
        let text = render("Resource %(file)s labelled %(label)s", &bindings()).expect("render");
        assert_eq!(
            text,
            "Resource http://example.org/ro/data file.csv labelled Data"
        );
    }

    #[test]
    fn render_escapes_percent() {
        assert_eq!(render("100%% of %(label)s", &bindings()).expect("render"), "100% of Data");
        assert_eq!(render("50% done", &bindings()).expect("render"), "50% done");
    }

    #[test]
    fn render_missing_binding_is_an_error() {
        assert_eq!(
            render("%(absent)s", &bindings()),
            Err(RenderError::MissingBinding("absent".to_string()))
        );
    }

    #[test]
    fn render_unterminated_placeholder_is_malformed() {
        assert_eq!(render("ok %(label", &bindings()), Err(RenderError::Malformed(3)));
        assert_eq!(render("%()s", &bindings()), Err(RenderError::Malformed(0)));
    }

    #[test]
    fn render_or_diagnostic_never_fails() {
        let text = render_or_diagnostic("Missing %(absent)s", &bindings());
        assert!(text.starts_with("Missing %(absent)s"));
        assert!(text.contains("missing binding 'absent'"));
    }

    #[test]
    fn reserved_expansion_keeps_uri_structure() {
        let template = UriTemplate::parse("{+file}").expect("parse");
        assert_eq!(
            template.expand(&bindings()).expect("expand"),
            "http://example.org/ro/data%20file.csv"
        );
    }

    #[test]
    fn simple_expansion_encodes_reserved() {
        let template = UriTemplate::parse("http://lookup.example/?q={label}&u={file}").expect("parse");
        assert_eq!(
            template.expand(&bindings()).expect("expand"),
            "http://lookup.example/?q=Data&u=http%3A%2F%2Fexample.org%2Fro%2Fdata%20file.csv"
        );
    }

    #[test]
    fn template_variables_are_listed() {
        let template = UriTemplate::parse("{+a}/x/{b,c}").expect("parse");
        let names: Vec<_> = template.variables().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn template_missing_variable_is_an_error() {
        let template = UriTemplate::parse("{+nothing}").expect("parse");
        assert_eq!(
            template.expand(&bindings()),
            Err(RenderError::MissingBinding("nothing".to_string()))
        );
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(UriTemplate::parse("{+open").is_err());
        assert!(UriTemplate::parse("close}").is_err());
        assert!(UriTemplate::parse("{}").is_err());
        assert!(UriTemplate::parse("{+a b}").is_err());
    }

    #[test]
    fn existing_percent_encoding_survives_reserved_expansion() {
        let b = Bindings::new().with("u", Term::iri("http://example.org/a%20b"));
        let template = UriTemplate::parse("{+u}").expect("parse");
        assert_eq!(template.expand(&b).expect("expand"), "http://example.org/a%20b");
    }
}
