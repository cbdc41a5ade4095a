//! Helpers shared by every dialect: path joining, doc tags, return types and
//! parameter binding.

use crate::classify::{ClassifyContext, OperationDraft, ParameterBinding};
use crate::document::model::{ParamLocation, Tag};
use crate::frontend::{ClassDecl, MethodDecl, ParamDecl, TypeRef};
use crate::schema::{models, Schema};
use indexmap::IndexMap;

/// Return wrappers whose first argument is the real payload.
const RETURN_WRAPPERS: &[&str] = &[
    "ResponseEntity",
    "HttpEntity",
    "Mono",
    "CompletableFuture",
    "CompletionStage",
    "ListenableFuture",
    "DeferredResult",
    "Callable",
    "Optional",
];

/// Collapses runs of `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// `normalize("/" + parent + "/" + method)`; the parent alone without a method path.
pub fn join_path(parent: Option<&str>, method: Option<&str>) -> String {
    let parent = parent.unwrap_or("");
    match method {
        Some(m) => normalize(&format!("/{}/{}", parent, m)),
        None => normalize(&format!("/{}", parent)),
    }
}

/// Media-type and request-method constants by member name.
pub fn resolve_constant(field: &str) -> String {
    let key = field.strip_suffix("_VALUE").unwrap_or(field);
    let value = match key {
        "ALL" | "WILDCARD" => "*/*",
        "APPLICATION_ATOM_XML" => "application/atom+xml",
        "APPLICATION_FORM_URLENCODED" => "application/x-www-form-urlencoded",
        "APPLICATION_JSON" => "application/json",
        "APPLICATION_JSON_UTF8" => "application/json;charset=UTF-8",
        "APPLICATION_OCTET_STREAM" => "application/octet-stream",
        "APPLICATION_PDF" => "application/pdf",
        "APPLICATION_PROBLEM_JSON" => "application/problem+json",
        "APPLICATION_STREAM_JSON" => "application/stream+json",
        "APPLICATION_XHTML_XML" => "application/xhtml+xml",
        "APPLICATION_XML" => "application/xml",
        "IMAGE_GIF" => "image/gif",
        "IMAGE_JPEG" => "image/jpeg",
        "IMAGE_PNG" => "image/png",
        "MULTIPART_FORM_DATA" => "multipart/form-data",
        "TEXT_EVENT_STREAM" | "SERVER_SENT_EVENTS" => "text/event-stream",
        "TEXT_HTML" => "text/html",
        "TEXT_MARKDOWN" => "text/markdown",
        "TEXT_PLAIN" => "text/plain",
        "TEXT_XML" => "text/xml",
        _ => return field.to_string(),
    };
    value.to_string()
}

/// A draft with owner, method name and doc tags filled in.
pub fn draft_for(class: &ClassDecl, method: &MethodDecl) -> OperationDraft {
    let doc = method.doc_comment();
    let mut draft = OperationDraft {
        owner_name: class.name.clone(),
        method_name: method.name.clone(),
        summary: doc.summary(),
        ..Default::default()
    };
    for tag in &doc.tags {
        let content = Some(tag.content.clone()).filter(|c| !c.is_empty());
        match tag.tag.as_str() {
            "throws" | "exception" => {
                draft.error_description = match (&tag.name, content) {
                    (Some(name), Some(text)) => Some(format!("{} {}", name, text)),
                    (Some(name), None) => Some(name.clone()),
                    (None, text) => text,
                }
            }
            "return" => draft.return_description = content,
            "apinote" => draft.description = content,
            "param" => {
                if let (Some(name), Some(text)) = (&tag.name, content) {
                    draft.param_docs.insert(name.clone(), text);
                }
            }
            _ => {}
        }
    }
    draft
}

/// The tag of a marked class.
pub fn tag_for(class: &ClassDecl) -> Tag {
    Tag {
        name: class.name.clone(),
        description: class.doc_comment().summary(),
    }
}

fn parse_or_untyped(expr: &str, owner: &str) -> Option<TypeRef> {
    match TypeRef::parse(expr) {
        Ok(ty) => Some(ty),
        Err(e) => {
            tracing::warn!(owner, expr, error = %e, "unparseable type expression");
            None
        }
    }
}

/// The success response schema; `None` for `void`.
pub fn return_schema(method: &MethodDecl, cx: &ClassifyContext<'_>) -> Option<Schema> {
    let expr = method.return_type.as_deref()?.trim();
    if expr.is_empty() || expr == "void" || expr == "java.lang.Void" || expr == "Void" {
        return None;
    }
    let Some(mut ty) = parse_or_untyped(expr, &method.name) else {
        return Some(Schema::untyped());
    };
    while RETURN_WRAPPERS.contains(&ty.simple_name().as_str()) {
        match ty.args().first() {
            Some(inner) => ty = inner.clone(),
            None => return Some(Schema::untyped()),
        }
    }
    Some(cx.resolver.resolve(&ty).as_use_site())
}

/// A parameter between resolution and final binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamCandidate {
    /// Name as declared; keys `@param` docs.
    pub declared_name: String,
    /// External name.
    pub name: String,
    /// Fully resolved schema.
    pub schema: Schema,
    /// Explicit location, `None` when no binding annotation was present.
    pub location: Option<ParamLocation>,
    /// Required flag.
    pub required: bool,
    /// Default value.
    pub default: Option<String>,
}

/// Resolves a parameter's type; `None` for framework-injected parameters.
pub fn candidate(param: &ParamDecl, cx: &ClassifyContext<'_>) -> Option<ParamCandidate> {
    let ty = parse_or_untyped(&param.ty, &param.name);
    let type_name = ty.as_ref().and_then(|t| t.name()).unwrap_or(param.ty.as_str());
    if cx.config.is_injected(type_name) {
        return None;
    }
    let schema = ty
        .map(|t| cx.resolver.resolve(&t))
        .unwrap_or_else(Schema::untyped);
    Some(ParamCandidate {
        declared_name: param.name.clone(),
        name: param.name.clone(),
        schema,
        location: None,
        required: false,
        default: None,
    })
}

/// Turns candidates into bindings. When no parameter is explicitly bound to
/// the body, the first unbound eligible parameter is promoted to the body;
/// every other unbound parameter becomes a query binding.
pub fn finish_bindings(
    candidates: Vec<ParamCandidate>,
    docs: &IndexMap<String, String>,
    eligible: impl Fn(&Schema) -> bool,
) -> Vec<ParameterBinding> {
    let has_body = candidates
        .iter()
        .any(|c| c.location == Some(ParamLocation::Body));
    let mut promoted = has_body;

    candidates
        .into_iter()
        .map(|c| {
            let location = match c.location {
                Some(location) => location,
                None if !promoted && eligible(&c.schema) => {
                    promoted = true;
                    ParamLocation::Body
                }
                None => ParamLocation::Query,
            };
            let description = docs
                .get(&c.declared_name)
                .cloned()
                .or_else(|| c.schema.description().map(str::to_string));
            let schema = if location == ParamLocation::Body {
                models::to_model(&c.schema.as_use_site())
            } else {
                narrow(&c.schema)
            };
            ParameterBinding {
                location,
                name: c.name,
                schema,
                required: c.required,
                default: c.default,
                description,
            }
        })
        .collect()
}

/// Removes repeated entries, keeping the first occurrence.
pub fn dedup<T: PartialEq + Clone>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}

/// Non-body values cannot be structured in the source dialect.
fn narrow(schema: &Schema) -> Schema {
    if schema.is_structured() {
        Schema::string().with_description(schema.description().map(str::to_string))
    } else {
        models::to_model(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::annotations::DocComment;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("//a///b/"), "/a/b/");
        assert_eq!(join_path(Some(""), Some("x")), "/x");
        assert_eq!(join_path(None, Some("/x/")), "/x/");
        assert_eq!(join_path(Some("/api/"), None), "/api/");
    }

    #[test]
    fn test_constants() {
        assert_eq!(resolve_constant("APPLICATION_JSON_VALUE"), "application/json");
        assert_eq!(resolve_constant("TEXT_PLAIN"), "text/plain");
        assert_eq!(resolve_constant("GET"), "GET");
    }

    #[test]
    fn test_draft_doc_tags() {
        let class = ClassDecl {
            name: "UserController".into(),
            ..Default::default()
        };
        let method = MethodDecl {
            name: "find".into(),
            doc: Some(
                "/**\n * Finds a user.\n * @param id the id\n * @return the user\n * @throws NotFound missing\n * @apiNote cached\n */"
                    .into(),
            ),
            ..Default::default()
        };
        let draft = draft_for(&class, &method);
        assert_eq!(draft.owner_name, "UserController");
        assert_eq!(draft.summary.as_deref(), Some("Finds a user."));
        assert_eq!(draft.param_docs["id"], "the id");
        assert_eq!(draft.return_description.as_deref(), Some("the user"));
        assert_eq!(draft.error_description.as_deref(), Some("NotFound missing"));
        assert_eq!(draft.description.as_deref(), Some("cached"));
        assert!(DocComment::parse("").tags.is_empty());
    }

    fn structured(name: &str) -> ParamCandidate {
        ParamCandidate {
            declared_name: name.into(),
            name: name.into(),
            schema: Schema::reference("User"),
            location: None,
            required: false,
            default: None,
        }
    }

    #[test]
    fn test_first_body_wins() {
        let bindings = finish_bindings(
            vec![structured("a"), structured("b")],
            &IndexMap::new(),
            Schema::is_structured,
        );
        assert_eq!(bindings[0].location, ParamLocation::Body);
        assert_eq!(bindings[0].schema, Schema::reference("User"));
        assert_eq!(bindings[1].location, ParamLocation::Query);
        assert_eq!(bindings[1].schema, Schema::string());
    }

    #[test]
    fn test_explicit_body_blocks_promotion() {
        let mut explicit = structured("b");
        explicit.location = Some(ParamLocation::Body);
        let bindings = finish_bindings(
            vec![structured("a"), explicit],
            &IndexMap::new(),
            Schema::is_structured,
        );
        assert_eq!(bindings[0].location, ParamLocation::Query);
        assert_eq!(bindings[1].location, ParamLocation::Body);
    }

    #[test]
    fn test_param_doc_description() {
        let mut docs = IndexMap::new();
        docs.insert("a".to_string(), "the payload".to_string());
        let bindings = finish_bindings(vec![structured("a")], &docs, Schema::is_structured);
        assert_eq!(bindings[0].description.as_deref(), Some("the payload"));
    }
}
