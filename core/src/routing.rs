//! # Route Matcher
//!
//! Resolves an inbound path and method to an operation of an `ApiDocument`.
//!
//! An exact template match is tried first. Otherwise templates are scanned in
//! document order with ant-style segment globs and the first match wins:
//!
//! - `?` matches one character within a segment.
//! - `*` matches zero or more characters within a segment.
//! - `**` matches zero or more whole segments.
//! - `{name}` matches one non-empty segment portion and captures it.

use crate::document::model::{ApiDocument, HttpVerb, Operation};
use indexmap::IndexMap;
use regex::Regex;

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    /// The matched path template.
    pub template: &'a str,
    /// The operation bound to the template and verb.
    pub operation: &'a Operation,
    /// Values of `{name}` placeholders.
    pub variables: IndexMap<String, String>,
}

struct CompiledTemplate<'a> {
    template: &'a str,
    regex: Regex,
    names: Vec<String>,
}

/// Matches inbound requests against the templates of one document.
pub struct RouteMatcher<'a> {
    document: &'a ApiDocument,
    templates: Vec<CompiledTemplate<'a>>,
}

impl<'a> RouteMatcher<'a> {
    /// Compiles every template of `document`; a template that does not
    /// compile is skipped.
    pub fn new(document: &'a ApiDocument) -> Self {
        let templates = document
            .paths
            .keys()
            .filter_map(|template| match compile(template) {
                Ok((regex, names)) => Some(CompiledTemplate {
                    template: template.as_str(),
                    regex,
                    names,
                }),
                Err(e) => {
                    tracing::warn!(%template, error = %e, "path template skipped by matcher");
                    None
                }
            })
            .collect();
        Self {
            document,
            templates,
        }
    }

    /// The operation for `method` (case-insensitive) on `path`; `None` when
    /// the method is unknown or either lookup misses.
    pub fn find(&self, method: &str, path: &str) -> Option<RouteMatch<'a>> {
        let verb: HttpVerb = method.parse().ok()?;
        let raw = path;
        let path = normalize_inbound(raw);

        let exact = self
            .document
            .paths
            .get_key_value(raw)
            .or_else(|| self.document.paths.get_key_value(path.as_str()));
        if let Some((template, item)) = exact {
            return item.get(&verb).map(|operation| RouteMatch {
                template: template.as_str(),
                operation,
                variables: IndexMap::new(),
            });
        }

        let compiled = self.templates.iter().find(|t| t.regex.is_match(&path))?;
        let item = self.document.paths.get(compiled.template)?;
        let operation = item.get(&verb)?;
        let variables = compiled
            .regex
            .captures(&path)
            .map(|caps| {
                compiled
                    .names
                    .iter()
                    .enumerate()
                    .filter_map(|(i, name)| {
                        caps.get(i + 1)
                            .map(|m| (name.clone(), m.as_str().to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(RouteMatch {
            template: compiled.template,
            operation,
            variables,
        })
    }
}

/// Whether `path` matches the ant-style `pattern`.
pub fn ant_match(pattern: &str, path: &str) -> bool {
    compile(pattern)
        .map(|(regex, _)| regex.is_match(&normalize_inbound(path)))
        .unwrap_or(false)
}

/// Leading slash, no repeated or trailing separators.
fn normalize_inbound(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Builds an anchored regex and the placeholder names in capture order.
fn compile(template: &str) -> Result<(Regex, Vec<String>), regex::Error> {
    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        pattern.push('/');
    }
    for segment in segments {
        if segment == "**" {
            pattern.push_str("(?:/[^/]+)*");
            continue;
        }
        pattern.push('/');
        pattern.push_str(&segment_pattern(segment, &mut names));
    }
    pattern.push('$');
    Ok((Regex::new(&pattern)?, names))
}

fn segment_pattern(segment: &str, names: &mut Vec<String>) -> String {
    let mut out = String::new();
    let mut chars = segment.chars();
    let mut literal = String::new();
    while let Some(c) = chars.next() {
        let token = match c {
            '*' => "[^/]*".to_string(),
            '?' => "[^/]".to_string(),
            '{' => {
                let mut name = String::new();
                for n in chars.by_ref() {
                    if n == '}' {
                        break;
                    }
                    name.push(n);
                }
                let (name, inner) = match name.split_once(':') {
                    Some((n, re)) => (n.to_string(), re.to_string()),
                    None => (name, "[^/]+".to_string()),
                };
                names.push(name);
                format!("({})", inner)
            }
            other => {
                literal.push(other);
                continue;
            }
        };
        out.push_str(&regex::escape(&literal));
        literal.clear();
        out.push_str(&token);
    }
    out.push_str(&regex::escape(&literal));
    out
}
