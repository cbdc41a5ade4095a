//! # Annotations & Doc Comments
//!
//! Declaration metadata as delivered by the language frontend: annotations
//! with their attribute values, and raw doc comments split into a
//! description and block tags.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// An attribute value attached to an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// A boolean literal.
    Bool(bool),
    /// A string literal.
    Str(String),
    /// An array initializer (`{"a", "b"}`).
    List(Vec<AnnotationValue>),
    /// A constant reference (`MediaType.APPLICATION_JSON_VALUE`); only the
    /// member name is kept.
    Field {
        /// Member name of the referenced constant.
        field: String,
    },
    /// Any other expression form the frontend could not fold to a constant.
    Expr {
        /// Source text of the expression.
        expr: String,
    },
}

impl AnnotationValue {
    /// Flattens the value into strings. Field references are passed through
    /// `resolve_field`; opaque expressions are dropped.
    pub fn strings(&self, resolve_field: &dyn Fn(&str) -> String) -> Vec<String> {
        match self {
            AnnotationValue::Str(s) => vec![s.clone()],
            AnnotationValue::Bool(b) => vec![b.to_string()],
            AnnotationValue::Field { field } => vec![resolve_field(field)],
            AnnotationValue::List(items) => items
                .iter()
                .flat_map(|item| item.strings(resolve_field))
                .collect(),
            AnnotationValue::Expr { expr } => {
                tracing::warn!(expr = %expr, "skipping unresolvable annotation attribute");
                Vec::new()
            }
        }
    }

    /// The first string the value flattens to, with field names kept as-is.
    pub fn as_str(&self) -> Option<String> {
        self.strings(&|f| f.to_string()).into_iter().next()
    }

    /// The boolean literal, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            AnnotationValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// A single annotation on a class, method, field or parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    /// Simple annotation name as written (`GetMapping`).
    pub name: String,
    /// Fully qualified name when the frontend could resolve it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    /// Single-member form (`@Path("/users")`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnnotationValue>,
    /// Named attributes (`@RequestParam(name = "q", required = false)`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, AnnotationValue>,
}

impl Annotation {
    /// Looks up a named attribute. `value` also matches the single-member form.
    pub fn attr(&self, key: &str) -> Option<&AnnotationValue> {
        match self.attributes.get(key) {
            Some(v) => Some(v),
            None if key == "value" => self.value.as_ref(),
            None => None,
        }
    }

    /// The first non-blank string among the given attribute keys.
    pub fn first_string(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.attr(k))
            .filter_map(AnnotationValue::as_str)
            .find(|s| !s.trim().is_empty())
    }

    /// Whether the simple or qualified name matches.
    pub fn is(&self, name: &str) -> bool {
        self.name == name || self.qualified_name.as_deref() == Some(name)
    }
}

/// Finds an annotation by simple name.
pub fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

/// A block tag (`@param id the user id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name without `@`, lowercased.
    pub tag: String,
    /// First word after the tag for tags that take a name (`param`, `throws`).
    pub name: Option<String>,
    /// Remaining text.
    pub content: String,
}

/// A doc comment split into description and block tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocComment {
    /// Text before the first block tag.
    pub description: String,
    /// Block tags in source order.
    pub tags: Vec<DocTag>,
}

impl DocComment {
    /// Parses a raw doc comment, with or without `/** */` framing.
    pub fn parse(raw: &str) -> Self {
        static TAG_RE: OnceLock<Regex> = OnceLock::new();
        let tag_re =
            TAG_RE.get_or_init(|| Regex::new(r"^@(\w+)\s*(.*)$").expect("Invalid regex"));

        let mut doc = DocComment::default();
        let mut description = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in raw.lines() {
            let line = line
                .trim()
                .trim_start_matches("/**")
                .trim_end_matches("*/")
                .trim_start_matches('*')
                .trim();

            if let Some(caps) = tag_re.captures(line) {
                if let Some((tag, lines)) = current.take() {
                    doc.tags.push(make_tag(&tag, &lines.join(" ")));
                }
                let tag = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
                let rest = caps.get(2).map_or("", |m| m.as_str()).to_string();
                current = Some((tag, vec![rest]));
            } else if let Some((_, lines)) = current.as_mut() {
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            } else {
                description.push(line.to_string());
            }
        }
        if let Some((tag, lines)) = current.take() {
            doc.tags.push(make_tag(&tag, &lines.join(" ")));
        }

        doc.description = description
            .join("\n")
            .trim()
            .to_string();
        doc
    }

    /// The description, `None` when blank.
    pub fn summary(&self) -> Option<String> {
        if self.description.is_empty() {
            None
        } else {
            Some(self.description.clone())
        }
    }
}

fn make_tag(tag: &str, text: &str) -> DocTag {
    let text = text.trim();
    match tag {
        "param" | "throws" | "exception" => {
            let mut parts = text.splitn(2, char::is_whitespace);
            let name = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            let content = parts.next().unwrap_or("").trim().to_string();
            DocTag {
                tag: tag.to_string(),
                name,
                content,
            }
        }
        _ => DocTag {
            tag: tag.to_string(),
            name: None,
            content: text.to_string(),
        },
    }
}
