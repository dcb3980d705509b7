//! RFC 6570 URI Templates (§4.A) — the subset MCP resource templates use:
//! the `+ # . / ? &` operators, literal text, and `{name}` / `{op name,...}`
//! expressions.
//!
//! A template is parsed once into [`TemplatePart`]s, which drive both
//! `expand` (bindings → URI) and `matches` (URI → bindings) so the two stay
//! in lockstep by construction rather than by convention.

use std::collections::HashMap;

use regex::Regex;

use crate::error::ErrorKind;

/// One of the RFC 6570 expression operators this subset understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    /// No operator: `{name}`.
    Simple,
    /// `{+name}` — reserved-character expansion.
    Reserved,
    /// `{#name}` — fragment expansion.
    Fragment,
    /// `{.name}` — label expansion, dot-prefixed.
    Label,
    /// `{/name}` — path-segment expansion, slash-prefixed.
    PathSegment,
    /// `{?name}` — form-style query, starts a query string.
    Query,
    /// `{&name}` — form-style query continuation.
    QueryContinuation,
}

impl Operator {
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::PathSegment),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    /// Character separating multiple bound values within one expression.
    fn value_separator(self) -> char {
        match self {
            Self::Label => '.',
            Self::PathSegment => '/',
            Self::Query | Self::QueryContinuation => '&',
            Self::Simple | Self::Reserved | Self::Fragment => ',',
        }
    }

    /// Whether values are percent-encoded. Only the bare `{name}` operator
    /// does; every operator with a prefix character passes its value through
    /// unencoded (spec.md §4.A's modifier table).
    fn encodes_reserved_chars(self) -> bool {
        matches!(self, Self::Simple)
    }

    /// Character class used to match one bound value's worth of text.
    /// This is deliberately coarse — a subset implementation, not a
    /// character-by-character RFC 6570 validator.
    fn match_class(self) -> &'static str {
        match self {
            Self::Query | Self::QueryContinuation => "[^&]+",
            Self::Reserved | Self::Fragment => "[^/]+(?:/[^/]+)*",
            Self::Simple | Self::Label | Self::PathSegment => "[^/]+",
        }
    }

    /// Literal character this operator prefixes the expansion with, if any.
    /// Used both when expanding (to emit the prefix) and when building the
    /// matching regex (to consume it before the value's capture group).
    fn prefix_char(self) -> Option<char> {
        match self {
            Self::Fragment => Some('#'),
            Self::Label => Some('.'),
            Self::PathSegment => Some('/'),
            Self::Query => Some('?'),
            Self::QueryContinuation => Some('&'),
            Self::Simple | Self::Reserved => None,
        }
    }
}

/// A literal span or a variable expression within a parsed template.
#[derive(Debug, Clone)]
enum TemplatePart {
    Literal(String),
    Expression {
        operator: Operator,
        names: Vec<String>,
    },
}

/// A parsed RFC 6570 template, ready to expand or match.
///
/// Multi-name expressions (`{a,b}`) are a known limitation (§9, REDESIGN
/// FLAGS): the whole expression matches as a single capture group, so every
/// name in it is bound to the *same* raw text rather than being split. This
/// is implemented exactly as flagged, not "fixed" — see the regression test
/// below.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    pattern: String,
    parts: Vec<TemplatePart>,
    regex: Regex,
    variable_names: Vec<String>,
}

impl UriTemplate {
    /// Parse a template string, building both the expansion parts and the
    /// matching regex up front.
    pub fn parse(pattern: &str) -> Result<Self, ErrorKind> {
        let parts = Self::parse_parts(pattern)?;
        let regex = Self::build_regex(&parts)?;
        let variable_names = parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Expression { names, .. } => Some(names.clone()),
                TemplatePart::Literal(_) => None,
            })
            .flatten()
            .collect();

        Ok(Self {
            pattern: pattern.to_string(),
            parts,
            regex,
            variable_names,
        })
    }

    fn parse_parts(pattern: &str) -> Result<Vec<TemplatePart>, ErrorKind> {
        let mut parts = Vec::new();
        let mut chars = pattern.char_indices().peekable();
        let mut literal_start = 0;

        while let Some((i, c)) = chars.next() {
            if c != '{' {
                continue;
            }
            if i > literal_start {
                parts.push(TemplatePart::Literal(pattern[literal_start..i].to_string()));
            }

            let close = pattern[i..].find('}').map(|offset| i + offset).ok_or_else(|| {
                ErrorKind::InvalidTemplate {
                    template: pattern.to_string(),
                    reason: "unterminated '{' expression".to_string(),
                }
            })?;

            let body = &pattern[i + 1..close];
            if body.is_empty() {
                return Err(ErrorKind::InvalidTemplate {
                    template: pattern.to_string(),
                    reason: "empty expression '{}'".to_string(),
                });
            }

            let mut body_chars = body.chars();
            let first = body_chars.clone().next().unwrap();
            let (operator, names_str) = match Operator::from_prefix(first) {
                Some(op) => {
                    body_chars.next();
                    (op, body_chars.as_str())
                }
                None => (Operator::Simple, body),
            };

            let names: Vec<String> = names_str
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            if names.is_empty() {
                return Err(ErrorKind::InvalidTemplate {
                    template: pattern.to_string(),
                    reason: "expression has no variable names".to_string(),
                });
            }

            parts.push(TemplatePart::Expression { operator, names });

            // Advance the outer char_indices iterator past the consumed expression.
            while let Some(&(j, _)) = chars.peek() {
                if j >= close {
                    break;
                }
                chars.next();
            }
            literal_start = close + 1;
        }

        if literal_start < pattern.len() {
            parts.push(TemplatePart::Literal(pattern[literal_start..].to_string()));
        }

        Ok(parts)
    }

    fn build_regex(parts: &[TemplatePart]) -> Result<Regex, ErrorKind> {
        let mut pattern = String::from("^");
        for part in parts {
            match part {
                TemplatePart::Literal(text) => pattern.push_str(&regex::escape(text)),
                TemplatePart::Expression { operator, .. } => {
                    if let Some(prefix) = operator.prefix_char() {
                        pattern.push_str(&regex::escape(&prefix.to_string()));
                    }
                    pattern.push('(');
                    pattern.push_str(operator.match_class());
                    pattern.push(')');
                }
            }
        }
        pattern.push('$');

        Regex::new(&pattern).map_err(|e| ErrorKind::InvalidTemplate {
            template: pattern,
            reason: e.to_string(),
        })
    }

    /// The original template string.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Variable names referenced anywhere in the template, in order of
    /// first appearance (duplicated if a multi-name expression repeats one).
    #[must_use]
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    /// Expand the template against `bindings`. A name with no binding is
    /// erased: the whole expression it belongs to is dropped from the output.
    #[must_use]
    pub fn expand(&self, bindings: &HashMap<String, String>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Expression { operator, names } => {
                    let bound: Vec<(&str, &str)> = names
                        .iter()
                        .filter_map(|name| bindings.get(name).map(|v| (name.as_str(), v.as_str())))
                        .collect();
                    if bound.is_empty() {
                        continue;
                    }
                    Self::expand_expression(&mut out, *operator, &bound);
                }
            }
        }
        out
    }

    fn expand_expression(out: &mut String, operator: Operator, bound: &[(&str, &str)]) {
        if let Some(p) = operator.prefix_char() {
            out.push(p);
        }

        let is_query = matches!(operator, Operator::Query | Operator::QueryContinuation);
        let sep = operator.value_separator();
        let mut first = true;
        for (name, value) in bound {
            if !first {
                out.push(sep);
            }
            first = false;
            if is_query {
                out.push_str(name);
                out.push('=');
            }
            if operator.encodes_reserved_chars() {
                out.push_str(&percent_encode(value));
            } else {
                out.push_str(value);
            }
        }
    }

    /// Match `uri` against this template, returning the bound variables if
    /// it matches. Every name within one multi-name expression is bound to
    /// the *same* captured text (§9's flagged limitation).
    #[must_use]
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(uri)?;
        let mut bindings = HashMap::new();

        let mut group_index = 1;
        for part in &self.parts {
            if let TemplatePart::Expression { names, .. } = part {
                if let Some(m) = captures.get(group_index) {
                    let raw = m.as_str().to_string();
                    for name in names {
                        bindings.insert(name.clone(), raw.clone());
                    }
                }
                group_index += 1;
            }
        }

        Some(bindings)
    }

    /// Whether `uri` matches this template, without collecting bindings.
    #[must_use]
    pub fn is_match(&self, uri: &str) -> bool {
        self.regex.is_match(uri)
    }
}

/// Percent-encode everything outside RFC 3986's unreserved set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_single_variable_round_trips() {
        let template = UriTemplate::parse("/users/{id}").unwrap();
        let mut bindings = HashMap::new();
        bindings.insert("id".to_string(), "42".to_string());
        assert_eq!(template.expand(&bindings), "/users/42");

        let matched = template.matches("/users/42").unwrap();
        assert_eq!(matched.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn two_variable_template_matches_the_spec_scenario() {
        let template = UriTemplate::parse("/users/{id}/posts/{post}").unwrap();
        let matched = template.matches("/users/42/posts/7").unwrap();
        assert_eq!(matched.get("id"), Some(&"42".to_string()));
        assert_eq!(matched.get("post"), Some(&"7".to_string()));
        assert!(!template.is_match("/users/42"));
    }

    #[test]
    fn unbound_variable_is_erased_from_expansion() {
        let template = UriTemplate::parse("/search{?q,limit}").unwrap();
        let mut bindings = HashMap::new();
        bindings.insert("q".to_string(), "rust".to_string());
        assert_eq!(template.expand(&bindings), "/search?q=rust");
    }

    #[test]
    fn reserved_operator_does_not_percent_encode() {
        let template = UriTemplate::parse("/files/{+path}").unwrap();
        let mut bindings = HashMap::new();
        bindings.insert("path".to_string(), "a/b/c".to_string());
        assert_eq!(template.expand(&bindings), "/files/a/b/c");
    }

    #[test]
    fn multi_name_expression_shares_one_capture() {
        // Known limitation (§9): {a,b} is one regex group, so both names
        // are bound to the same raw captured text rather than being split.
        let template = UriTemplate::parse("/pair/{a,b}").unwrap();
        let matched = template.matches("/pair/x-y").unwrap();
        assert_eq!(matched.get("a"), matched.get("b"));
        assert_eq!(matched.get("a"), Some(&"x-y".to_string()));
    }

    #[test]
    fn unterminated_expression_is_an_invalid_template_error() {
        let err = UriTemplate::parse("/users/{id").unwrap_err();
        assert!(matches!(err, ErrorKind::InvalidTemplate { .. }));
    }

    #[test]
    fn empty_expression_is_an_invalid_template_error() {
        let err = UriTemplate::parse("/users/{}").unwrap_err();
        assert!(matches!(err, ErrorKind::InvalidTemplate { .. }));
    }

    #[test]
    fn percent_encoding_escapes_reserved_characters() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("hello-world_1.0~x"), "hello-world_1.0~x");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn expand_then_match_round_trips_for_single_segment_values(
                value in "[A-Za-z0-9]{1,12}"
            ) {
                let template = UriTemplate::parse("/items/{id}").unwrap();
                let mut bindings = HashMap::new();
                bindings.insert("id".to_string(), value.clone());
                let uri = template.expand(&bindings);
                let matched = template.matches(&uri).unwrap();
                prop_assert_eq!(matched.get("id"), Some(&value));
            }

            #[test]
            fn expand_then_match_round_trips_for_the_reserved_operator(
                value in "[A-Za-z0-9]{1,12}"
            ) {
                let template = UriTemplate::parse("/files/{+path}").unwrap();
                let mut bindings = HashMap::new();
                bindings.insert("path".to_string(), value.clone());
                let uri = template.expand(&bindings);
                let matched = template.matches(&uri).unwrap();
                prop_assert_eq!(matched.get("path"), Some(&value));
            }

            #[test]
            fn expand_then_match_round_trips_for_the_fragment_operator(
                value in "[A-Za-z0-9]{1,12}"
            ) {
                let template = UriTemplate::parse("/items{#frag}").unwrap();
                let mut bindings = HashMap::new();
                bindings.insert("frag".to_string(), value.clone());
                let uri = template.expand(&bindings);
                let matched = template.matches(&uri).unwrap();
                prop_assert_eq!(matched.get("frag"), Some(&value));
            }

            #[test]
            fn expand_then_match_round_trips_for_the_label_operator(
                value in "[A-Za-z0-9]{1,12}"
            ) {
                let template = UriTemplate::parse("/file{.ext}").unwrap();
                let mut bindings = HashMap::new();
                bindings.insert("ext".to_string(), value.clone());
                let uri = template.expand(&bindings);
                let matched = template.matches(&uri).unwrap();
                prop_assert_eq!(matched.get("ext"), Some(&value));
            }

            #[test]
            fn expand_then_match_round_trips_for_the_path_segment_operator(
                value in "[A-Za-z0-9]{1,12}"
            ) {
                let template = UriTemplate::parse("/users{/id}").unwrap();
                let mut bindings = HashMap::new();
                bindings.insert("id".to_string(), value.clone());
                let uri = template.expand(&bindings);
                let matched = template.matches(&uri).unwrap();
                prop_assert_eq!(matched.get("id"), Some(&value));
            }
        }
    }
}
