//! Mapping dialect: `@RestController` classes with `@GetMapping`,
//! `@RequestMapping(method = ...)` and friends.

use crate::classify::common::{self, ParamCandidate};
use crate::classify::{ClassifyContext, OperationDraft, RouteClassifier};
use crate::document::model::{HttpVerb, ParamLocation, Tag};
use crate::frontend::{Annotation, ClassDecl, MethodDecl};
use crate::schema::Schema;

const MARKERS: &[&str] = &["Controller", "RestController", "FeignClient"];

/// Routing annotation to its fixed verb; `None` reads the `method` attribute.
fn route_verb(name: &str) -> Option<Option<HttpVerb>> {
    match name {
        "RequestMapping" => Some(None),
        "GetMapping" => Some(Some(HttpVerb::Get)),
        "PostMapping" => Some(Some(HttpVerb::Post)),
        "PutMapping" => Some(Some(HttpVerb::Put)),
        "DeleteMapping" => Some(Some(HttpVerb::Delete)),
        "PatchMapping" => Some(Some(HttpVerb::Patch)),
        _ => None,
    }
}

fn strings(ann: &Annotation, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|k| ann.attr(k))
        .flat_map(|v| v.strings(&common::resolve_constant))
        .collect()
}

/// The `@RequestMapping`-style dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingDialect;

impl MappingDialect {
    fn parent_path(class: &ClassDecl) -> Option<String> {
        if let Some(ann) = class.annotation("RequestMapping") {
            return strings(ann, &["value", "path"]).into_iter().next();
        }
        class
            .annotation("FeignClient")
            .and_then(|ann| strings(ann, &["path"]).into_iter().next())
    }

    /// Applies a binding annotation; returns false for unrelated annotations.
    fn bind(c: &mut ParamCandidate, ann: &Annotation, consumes: &mut Vec<String>) -> bool {
        let location = match ann.name.as_str() {
            "PathVariable" => ParamLocation::Path,
            "RequestParam" => ParamLocation::Query,
            "RequestHeader" => ParamLocation::Header,
            "CookieValue" => ParamLocation::Cookie,
            "RequestPart" => {
                consumes.push("multipart/form-data".to_string());
                ParamLocation::FormData
            }
            "RequestBody" => ParamLocation::Body,
            _ => return false,
        };
        c.location = Some(location);
        c.required = ann.attr("required").and_then(|v| v.as_bool()).unwrap_or(true);
        if location == ParamLocation::Body {
            return true;
        }
        if let Some(default) = ann.first_string(&["defaultValue"]) {
            c.default = Some(default);
            c.required = false;
        }
        if let Some(name) = ann.first_string(&["value", "name"]) {
            c.name = name;
        }
        true
    }

    /// `headers = "X-Version=2"` conditions become required header parameters.
    fn header_condition(expr: &str) -> Option<ParamCandidate> {
        let expr = expr.trim();
        if expr.is_empty() || expr.starts_with('!') {
            return None;
        }
        let (name, value) = match expr.split_once('=') {
            Some((n, v)) => (n.trim_end_matches('!').trim(), Some(v.trim().to_string())),
            None => (expr, None),
        };
        Some(ParamCandidate {
            declared_name: name.to_string(),
            name: name.to_string(),
            schema: Schema::string(),
            location: Some(ParamLocation::Header),
            required: true,
            default: value,
        })
    }
}

impl RouteClassifier for MappingDialect {
    fn dialect(&self) -> &'static str {
        "mapping"
    }

    fn controller_tag(&self, class: &ClassDecl) -> Option<Tag> {
        MARKERS
            .iter()
            .any(|m| class.annotation(m).is_some())
            .then(|| common::tag_for(class))
    }

    fn classify(
        &self,
        class: &ClassDecl,
        method: &MethodDecl,
        cx: &ClassifyContext<'_>,
    ) -> Option<OperationDraft> {
        let routes: Vec<(&Annotation, Option<HttpVerb>)> = method
            .annotations
            .iter()
            .filter_map(|a| route_verb(&a.name).map(|verb| (a, verb)))
            .collect();
        if routes.is_empty() {
            return None;
        }

        let mut draft = common::draft_for(class, method);
        draft.parent_path = Self::parent_path(class);
        let mut conditions = Vec::new();

        for (ann, fixed) in routes {
            draft.paths.extend(strings(ann, &["value", "path"]));
            draft.consumes.extend(strings(ann, &["consumes"]));
            draft.produces.extend(strings(ann, &["produces"]));
            conditions.extend(
                strings(ann, &["headers"])
                    .iter()
                    .filter_map(|h| Self::header_condition(h)),
            );
            match fixed {
                Some(verb) => draft.verbs.push(verb),
                None => {
                    for name in strings(ann, &["method"]) {
                        match name.parse::<HttpVerb>() {
                            Ok(verb) => draft.verbs.push(verb),
                            Err(e) => tracing::warn!(method = %method.name, "{}", e),
                        }
                    }
                    if draft.verbs.is_empty() {
                        draft.verbs.push(HttpVerb::Post);
                    }
                }
            }
        }

        let mut candidates = Vec::new();
        for param in &method.parameters {
            let Some(mut c) = common::candidate(param, cx) else {
                continue;
            };
            for ann in &param.annotations {
                if Self::bind(&mut c, ann, &mut draft.consumes) {
                    break;
                }
            }
            candidates.push(c);
        }
        candidates.extend(conditions);

        draft.parameters =
            common::finish_bindings(candidates, &draft.param_docs, Schema::is_structured);
        draft.return_schema = common::return_schema(method, cx);
        common::dedup(&mut draft.verbs);
        common::dedup(&mut draft.consumes);
        common::dedup(&mut draft.produces);
        Some(draft)
    }
}
