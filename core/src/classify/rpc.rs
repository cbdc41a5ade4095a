//! RPC dialect: every public method of a class exported as an RPC service is
//! routed as `POST /<Class>/<method>`.

use crate::classify::common;
use crate::classify::{ClassifyContext, OperationDraft, RouteClassifier};
use crate::document::model::{HttpVerb, Tag};
use crate::frontend::{ClassDecl, MethodDecl};
use crate::schema::Schema;

/// Media type of RPC invocations.
pub const RPC_MEDIA_TYPE: &str = "application/dubbo";

const SERVICE_ANNOTATIONS: &[&str] = &[
    "com.alibaba.dubbo.config.annotation.Service",
    "org.apache.dubbo.config.annotation.Service",
    "org.apache.dubbo.config.annotation.DubboService",
];

/// Structured values, and arrays of them, travel in the body.
fn body_eligible(schema: &Schema) -> bool {
    match schema {
        Schema::Array { items, .. } => {
            items.is_structured() || matches!(**items, Schema::Array { .. })
        }
        other => other.is_structured(),
    }
}

/// The RPC service dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcDialect;

impl RouteClassifier for RpcDialect {
    fn dialect(&self) -> &'static str {
        "rpc"
    }

    /// Only the qualified service annotation counts; a bare `@Service` is a
    /// plain component.
    fn controller_tag(&self, class: &ClassDecl) -> Option<Tag> {
        class
            .annotations
            .iter()
            .any(|a| {
                SERVICE_ANNOTATIONS.iter().any(|q| a.is(q))
                    || (a.name == "DubboService" && a.qualified_name.is_none())
            })
            .then(|| common::tag_for(class))
    }

    fn classify(
        &self,
        class: &ClassDecl,
        method: &MethodDecl,
        cx: &ClassifyContext<'_>,
    ) -> Option<OperationDraft> {
        let mut draft = common::draft_for(class, method);
        draft.parent_path = Some(class.name.clone());
        draft.paths = vec![method.name.clone()];
        draft.verbs = vec![HttpVerb::Post];
        draft.consumes = vec![RPC_MEDIA_TYPE.to_string()];

        let candidates = method
            .parameters
            .iter()
            .filter_map(|p| common::candidate(p, cx))
            .collect();
        draft.parameters = common::finish_bindings(candidates, &draft.param_docs, body_eligible);
        draft.return_schema = common::return_schema(method, cx);
        Some(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::document::model::ParamLocation;
    use crate::frontend::{SourceManifest, TypeTable};
    use crate::schema::{ResolverContext, TypeResolver};

    const MANIFEST: &str = r#"
types:
  com.acme.Invoice:
    fields:
      - {name: total, type: java.math.BigDecimal}
classes:
  - name: BillingServiceImpl
    doc: "Billing"
    annotations:
      - {name: Service, qualified_name: com.alibaba.dubbo.config.annotation.Service}
    methods:
      - name: issue
        doc: "/** Issue an invoice.\n * @throws BillingException when closed */"
        return_type: com.acme.Invoice
        parameters:
          - {name: customerId, type: long}
          - {name: draft, type: com.acme.Invoice}
          - {name: copy, type: com.acme.Invoice}
      - name: batch
        parameters:
          - {name: invoices, type: "java.util.List<com.acme.Invoice>"}
  - name: SpringBean
    annotations: [{name: Service}]
"#;

    #[test]
    fn test_rpc_service() {
        let manifest = SourceManifest::from_yaml(MANIFEST).unwrap();
        let table = TypeTable::from_manifest(&manifest).unwrap();
        let ctx = ResolverContext::default();
        let config = GeneratorConfig::default();
        let cx = ClassifyContext {
            resolver: TypeResolver::new(&table, &ctx),
            config: &config,
        };
        let class = &manifest.classes[0];
        assert_eq!(RpcDialect.controller_tag(class).unwrap().name, "BillingServiceImpl");
        assert!(RpcDialect.controller_tag(&manifest.classes[1]).is_none());

        let issue = RpcDialect.classify(class, &class.methods[0], &cx).unwrap();
        assert_eq!(issue.full_paths(), vec!["/BillingServiceImpl/issue"]);
        assert_eq!(issue.verbs, vec![HttpVerb::Post]);
        assert_eq!(issue.consumes, vec![RPC_MEDIA_TYPE]);
        assert_eq!(issue.error_description.as_deref(), Some("BillingException when closed"));
        let locations: Vec<_> = issue.parameters.iter().map(|p| p.location).collect();
        assert_eq!(
            locations,
            vec![ParamLocation::Query, ParamLocation::Body, ParamLocation::Query]
        );

        let batch = RpcDialect.classify(class, &class.methods[1], &cx).unwrap();
        assert_eq!(batch.parameters[0].location, ParamLocation::Body);
        assert_eq!(
            batch.parameters[0].schema,
            Schema::array(Schema::reference("Invoice"))
        );
    }
}
