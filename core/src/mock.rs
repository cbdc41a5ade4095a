//! # Mock Facility
//!
//! Answers a request against a project document with an example of the
//! matched operation's success response.

use crate::document::model::{ApiDocument, Response};
use crate::error::{AppError, AppResult};
use crate::example::ExampleMaterializer;
use crate::routing::RouteMatcher;
use crate::schema::Schema;
use serde_json::Value as JsonValue;

/// Content type used when the operation declares no produces entry.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// A synthesized response.
#[derive(Debug, Clone, PartialEq)]
pub struct MockReply {
    /// The matched path template.
    pub template: String,
    /// First produces entry of the operation.
    pub content_type: String,
    /// Example body; `None` when the response declares no schema.
    pub body: Option<JsonValue>,
}

/// Resolves `method` and `path` and materializes the response example.
/// A routing miss is `AppError::NotFound`.
pub fn mock_reply(
    document: &ApiDocument,
    method: &str,
    path: &str,
    max_depth: usize,
) -> AppResult<MockReply> {
    let matcher = RouteMatcher::new(document);
    let route = matcher
        .find(method, path)
        .ok_or_else(|| AppError::NotFound(format!("{} {}", method.to_uppercase(), path)))?;
    let operation = route.operation;

    let content_type = operation
        .produces
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let response = operation
        .responses
        .get("200")
        .or_else(|| operation.responses.values().next());
    let body = response.and_then(|response| {
        literal_example(document, response, &content_type).or_else(|| {
            let schema = response.schema.as_ref()?;
            let mut materializer = ExampleMaterializer::new(&document.definitions, max_depth);
            Some(materializer.materialize(schema))
        })
    });

    tracing::debug!(template = route.template, %content_type, "mock reply");
    Ok(MockReply {
        template: route.template.to_string(),
        content_type,
        body,
    })
}

/// Response examples (for the content type, else the first one), then the
/// example of a referenced definition, then the schema's own example.
fn literal_example(
    document: &ApiDocument,
    response: &Response,
    content_type: &str,
) -> Option<JsonValue> {
    if let Some(example) = response
        .examples
        .get(content_type)
        .or_else(|| response.examples.values().next())
    {
        return Some(example.clone());
    }
    let schema = response.schema.as_ref()?;
    if let Schema::Reference { name, .. } = schema {
        if let Some(example) = document.definitions.get(name).and_then(Schema::example) {
            return Some(example.clone());
        }
    }
    schema.example().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{HttpVerb, Operation, PathItem};
    use crate::schema::{ObjectSchema, PrimitiveSchema, PrimitiveType};
    use indexmap::IndexMap;
    use serde_json::json;

    fn document(response: Response, produces: Vec<String>) -> ApiDocument {
        let mut doc = ApiDocument::new("shop", "1");
        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), response);
        let mut item = PathItem::new();
        item.insert(
            HttpVerb::Get,
            Operation {
                produces,
                responses,
                ..Default::default()
            },
        );
        doc.paths.insert("/pets/{id}".into(), item);
        doc.definitions.insert(
            "Pet".into(),
            Schema::Object(ObjectSchema {
                name: Some("Pet".into()),
                properties: [("name".to_string(), Schema::string())].into_iter().collect(),
                ..Default::default()
            }),
        );
        doc
    }

    #[test]
    fn test_generated_example() {
        let doc = document(
            Response {
                schema: Some(Schema::reference("Pet")),
                ..Default::default()
            },
            vec![],
        );
        let reply = mock_reply(&doc, "get", "/pets/3", 5).unwrap();
        assert_eq!(reply.template, "/pets/{id}");
        assert_eq!(reply.content_type, DEFAULT_CONTENT_TYPE);
        assert!(reply.body.unwrap()["name"].is_string());
    }

    #[test]
    fn test_response_example_wins() {
        let mut examples = IndexMap::new();
        examples.insert("application/xml".to_string(), json!("<pet/>"));
        let doc = document(
            Response {
                schema: Some(Schema::reference("Pet")),
                examples,
                ..Default::default()
            },
            vec!["application/xml".into()],
        );
        let reply = mock_reply(&doc, "GET", "/pets/3", 5).unwrap();
        assert_eq!(reply.content_type, "application/xml");
        assert_eq!(reply.body, Some(json!("<pet/>")));
    }

    #[test]
    fn test_definition_example() {
        let mut doc = document(
            Response {
                schema: Some(Schema::reference("Code")),
                ..Default::default()
            },
            vec![],
        );
        doc.definitions.insert(
            "Code".into(),
            Schema::Primitive(PrimitiveSchema::new(PrimitiveType::String).example("A-1")),
        );
        let reply = mock_reply(&doc, "GET", "/pets/1", 5).unwrap();
        assert_eq!(reply.body, Some(json!("A-1")));
    }

    #[test]
    fn test_routing_miss_is_not_found() {
        let doc = document(Response::default(), vec![]);
        let err = mock_reply(&doc, "POST", "/pets/1", 5).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = mock_reply(&doc, "GET", "/owners", 5).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_no_schema_no_body() {
        let doc = document(Response::default(), vec![]);
        assert_eq!(mock_reply(&doc, "GET", "/pets/1", 5).unwrap().body, None);
    }
}
