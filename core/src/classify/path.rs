//! Path dialect: `@Path` resources with `@GET`/`@POST` verb annotations.

use crate::classify::common::{self, ParamCandidate};
use crate::classify::{ClassifyContext, OperationDraft, RouteClassifier};
use crate::document::model::{HttpVerb, ParamLocation, Tag};
use crate::frontend::{Annotation, ClassDecl, MethodDecl};
use crate::schema::Schema;

const VERBS: &[(&str, HttpVerb)] = &[
    ("GET", HttpVerb::Get),
    ("POST", HttpVerb::Post),
    ("PUT", HttpVerb::Put),
    ("DELETE", HttpVerb::Delete),
    ("PATCH", HttpVerb::Patch),
    ("HEAD", HttpVerb::Head),
    ("OPTIONS", HttpVerb::Options),
];

fn verb_of(name: &str) -> Option<HttpVerb> {
    VERBS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

fn media_types(annotations: &[Annotation], name: &str) -> Vec<String> {
    annotations
        .iter()
        .filter(|a| a.name == name)
        .filter_map(|a| a.attr("value"))
        .flat_map(|v| v.strings(&common::resolve_constant))
        .collect()
}

/// The `@Path` resource dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathDialect;

impl PathDialect {
    fn bind(c: &mut ParamCandidate, ann: &Annotation, consumes: &mut Vec<String>) {
        let location = match ann.name.as_str() {
            "PathParam" => ParamLocation::Path,
            "QueryParam" => ParamLocation::Query,
            "HeaderParam" => ParamLocation::Header,
            "CookieParam" => ParamLocation::Cookie,
            "FormParam" => {
                consumes.push("multipart/form-data".to_string());
                ParamLocation::FormData
            }
            "BeanParam" => ParamLocation::Body,
            "DefaultValue" => {
                c.default = ann.first_string(&["value"]);
                return;
            }
            "NotNull" => {
                c.required = true;
                return;
            }
            _ => return,
        };
        c.location = Some(location);
        if location == ParamLocation::Path {
            c.required = true;
        }
        if location != ParamLocation::Body {
            if let Some(name) = ann.first_string(&["value"]) {
                c.name = name;
            }
        }
    }
}

impl RouteClassifier for PathDialect {
    fn dialect(&self) -> &'static str {
        "path"
    }

    fn controller_tag(&self, class: &ClassDecl) -> Option<Tag> {
        class.annotation("Path").map(|_| common::tag_for(class))
    }

    fn classify(
        &self,
        class: &ClassDecl,
        method: &MethodDecl,
        cx: &ClassifyContext<'_>,
    ) -> Option<OperationDraft> {
        let routed = method
            .annotations
            .iter()
            .any(|a| a.name == "Path" || verb_of(&a.name).is_some());
        if !routed {
            return None;
        }

        let mut draft = common::draft_for(class, method);
        draft.parent_path = class
            .annotation("Path")
            .and_then(|a| a.first_string(&["value"]));
        draft.paths = method
            .annotation("Path")
            .and_then(|a| a.first_string(&["value"]))
            .into_iter()
            .collect();
        draft.verbs = method
            .annotations
            .iter()
            .filter_map(|a| verb_of(&a.name))
            .collect();
        if draft.verbs.is_empty() {
            draft.verbs.push(HttpVerb::Get);
        }

        draft.consumes = media_types(&method.annotations, "Consumes");
        if draft.consumes.is_empty() {
            draft.consumes = media_types(&class.annotations, "Consumes");
        }
        draft.produces = media_types(&method.annotations, "Produces");
        if draft.produces.is_empty() {
            draft.produces = media_types(&class.annotations, "Produces");
        }

        let mut candidates = Vec::new();
        for param in &method.parameters {
            let Some(mut c) = common::candidate(param, cx) else {
                continue;
            };
            for ann in &param.annotations {
                Self::bind(&mut c, ann, &mut draft.consumes);
            }
            candidates.push(c);
        }

        draft.parameters =
            common::finish_bindings(candidates, &draft.param_docs, Schema::is_structured);
        draft.return_schema = common::return_schema(method, cx);
        common::dedup(&mut draft.verbs);
        common::dedup(&mut draft.consumes);
        Some(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::frontend::{SourceManifest, TypeTable};
    use crate::schema::{ResolverContext, TypeResolver};

    const MANIFEST: &str = r#"
types:
  com.acme.Order:
    fields:
      - {name: id, type: long}
classes:
  - name: OrderResource
    annotations:
      - {name: Path, value: "/orders"}
      - {name: Produces, value: {field: APPLICATION_JSON}}
    methods:
      - name: list
        annotations: [{name: GET}]
        parameters:
          - name: pageSize
            type: int
            annotations:
              - {name: QueryParam, value: "size"}
              - {name: DefaultValue, value: "20"}
      - name: get
        annotations: [{name: Path, value: "/{id}"}]
        return_type: com.acme.Order
        parameters:
          - name: id
            type: long
            annotations: [{name: PathParam, value: "id"}]
      - name: upload
        annotations:
          - {name: POST}
          - {name: Path, value: "upload"}
          - {name: Consumes, value: [{field: MULTIPART_FORM_DATA}]}
        parameters:
          - name: token
            type: String
            annotations: [{name: HeaderParam, value: "X-Token"}, {name: NotNull}]
          - name: order
            type: com.acme.Order
            annotations: [{name: BeanParam}]
      - name: internal
"#;

    fn drafts() -> Vec<OperationDraft> {
        let manifest = SourceManifest::from_yaml(MANIFEST).unwrap();
        let table = TypeTable::from_manifest(&manifest).unwrap();
        let ctx = ResolverContext::default();
        let config = GeneratorConfig::default();
        let cx = ClassifyContext {
            resolver: TypeResolver::new(&table, &ctx),
            config: &config,
        };
        let class = &manifest.classes[0];
        assert!(PathDialect.controller_tag(class).is_some());
        class
            .methods
            .iter()
            .filter_map(|m| PathDialect.classify(class, m, &cx))
            .collect()
    }

    #[test]
    fn test_verb_annotation_without_path() {
        let drafts = drafts();
        assert_eq!(drafts.len(), 3);
        let list = &drafts[0];
        assert_eq!(list.full_paths(), vec!["/orders"]);
        assert_eq!(list.verbs, vec![HttpVerb::Get]);
        assert_eq!(list.produces, vec!["application/json"]);
        let size = &list.parameters[0];
        assert_eq!(size.name, "size");
        assert_eq!(size.default.as_deref(), Some("20"));
        assert!(!size.required);
    }

    #[test]
    fn test_path_without_verb_defaults_to_get() {
        let drafts = drafts();
        let get = &drafts[1];
        assert_eq!(get.full_paths(), vec!["/orders/{id}"]);
        assert_eq!(get.verbs, vec![HttpVerb::Get]);
        assert!(get.parameters[0].required);
        assert_eq!(get.return_schema, Some(Schema::reference("Order")));
    }

    #[test]
    fn test_bean_param_and_header() {
        let drafts = drafts();
        let upload = &drafts[2];
        assert_eq!(upload.full_paths(), vec!["/orders/upload"]);
        assert_eq!(upload.verbs, vec![HttpVerb::Post]);
        assert_eq!(upload.consumes, vec!["multipart/form-data"]);
        assert_eq!(upload.parameters[0].name, "X-Token");
        assert_eq!(upload.parameters[0].location, ParamLocation::Header);
        assert!(upload.parameters[0].required);
        assert_eq!(upload.parameters[1].location, ParamLocation::Body);
    }
}
