//! # Dialect Converter
//!
//! Projects a finalized `ApiDocument` (Swagger 2.0) into OpenAPI 3.0.0.
//!
//! The projection is a structural rewrite over the serialized source form:
//! servers from schemes/host/basePath, request bodies pulled out of the
//! parameter list, flat parameter attributes nested under `schema`, response
//! schemas keyed by media type and reference anchors moved to
//! `#/components/schemas/`.

use crate::document::model::{ApiDocument, SecurityDefinition};
use crate::error::AppResult;
use crate::schema::model::DEFINITIONS_PREFIX;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, AuthorizationCode, ClientCredentials, Flow, Http, HttpAuthScheme,
    Implicit, OAuth2, Password, Scopes, SecurityScheme,
};

/// Version marker of the target dialect.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Anchor prefix of the target dialect.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const BINARY_MEDIA_TYPE: &str = "application/octet-stream";

/// Attributes a source dialect parameter carries flat and the target dialect
/// expects under `schema`.
const FLAT_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "default",
    "example",
    "items",
    "enum",
    "uniqueItems",
    "additionalProperties",
    "properties",
    "$ref",
];

/// Converts a document into the target dialect.
pub fn to_openapi(document: &ApiDocument) -> AppResult<JsonValue> {
    let source = serde_json::to_value(document)?;

    let mut out = JsonMap::new();
    out.insert("openapi".into(), json!(OPENAPI_VERSION));
    out.insert("info".into(), source["info"].clone());
    out.insert("servers".into(), servers(document));
    if let Some(tags) = source.get("tags") {
        out.insert("tags".into(), tags.clone());
    }

    let mut paths = source
        .get("paths")
        .cloned()
        .unwrap_or_else(|| JsonValue::Object(JsonMap::new()));
    if let JsonValue::Object(items) = &mut paths {
        for item in items.values_mut() {
            let JsonValue::Object(verbs) = item else {
                continue;
            };
            for (verb, operation) in verbs.iter_mut() {
                if let JsonValue::Object(op) = operation {
                    convert_operation(verb, op);
                }
            }
        }
    }
    out.insert("paths".into(), paths);

    let mut components = JsonMap::new();
    if let Some(definitions) = source.get("definitions") {
        components.insert("schemas".into(), definitions.clone());
    }
    if !document.security_definitions.is_empty() {
        let mut schemes = JsonMap::new();
        for (name, definition) in &document.security_definitions {
            schemes.insert(
                name.clone(),
                serde_json::to_value(security_scheme(definition))?,
            );
        }
        components.insert("securitySchemes".into(), JsonValue::Object(schemes));
    }
    out.insert("components".into(), JsonValue::Object(components));

    let mut result = JsonValue::Object(out);
    rewrite_anchors(&mut result);
    Ok(result)
}

/// One server per scheme; `http://localhost` when no scheme is declared.
fn servers(document: &ApiDocument) -> JsonValue {
    if document.schemes.is_empty() {
        return json!([{ "url": "http://localhost" }]);
    }
    let host = if document.host.is_empty() {
        "localhost"
    } else {
        document.host.as_str()
    };
    let base_path = if document.base_path.is_empty() {
        "/"
    } else {
        document.base_path.as_str()
    };
    document
        .schemes
        .iter()
        .map(|scheme| json!({ "url": format!("{}://{}{}", scheme.to_lowercase(), host, base_path) }))
        .collect()
}

fn security_scheme(definition: &SecurityDefinition) -> SecurityScheme {
    match definition {
        SecurityDefinition::ApiKey { name, location } => {
            let value = ApiKeyValue::new(name.clone());
            SecurityScheme::ApiKey(match location.as_str() {
                "query" => ApiKey::Query(value),
                "cookie" => ApiKey::Cookie(value),
                _ => ApiKey::Header(value),
            })
        }
        SecurityDefinition::OAuth2 {
            flow,
            authorization_url,
            token_url,
            scopes,
        } => {
            let scopes = Scopes::from_iter(scopes.iter().map(|(k, v)| (k.clone(), v.clone())));
            let authorization_url = authorization_url.clone().unwrap_or_default();
            let token_url = token_url.clone().unwrap_or_default();
            let flow = match flow.as_str() {
                "password" => Flow::Password(Password::new(token_url, scopes)),
                "application" => Flow::ClientCredentials(ClientCredentials::new(token_url, scopes)),
                "accessCode" => Flow::AuthorizationCode(AuthorizationCode::new(
                    authorization_url,
                    token_url,
                    scopes,
                )),
                _ => Flow::Implicit(Implicit::new(authorization_url, scopes)),
            };
            SecurityScheme::OAuth2(OAuth2::new([flow]))
        }
        SecurityDefinition::Basic => SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
    }
}

fn content_for(media_types: Option<&JsonValue>, schema: &JsonValue) -> JsonMap<String, JsonValue> {
    let mut content = JsonMap::new();
    let listed: Vec<&str> = media_types
        .and_then(JsonValue::as_array)
        .map(|list| list.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default();
    if listed.is_empty() {
        content.insert(DEFAULT_MEDIA_TYPE.into(), json!({ "schema": schema }));
    } else {
        for media_type in listed {
            content.insert(media_type.into(), json!({ "schema": schema }));
        }
    }
    content
}

fn is_file(param: &JsonValue) -> bool {
    param.get("in").and_then(JsonValue::as_str) != Some("body")
        && param.get("type").and_then(JsonValue::as_str) == Some("file")
}

fn is_body(param: &JsonValue) -> bool {
    param.get("in").and_then(JsonValue::as_str) == Some("body")
}

fn convert_operation(verb: &str, op: &mut JsonMap<String, JsonValue>) {
    let consumes = op.remove("consumes");
    let produces = op.remove("produces");
    let mut parameters = match op.remove("parameters") {
        Some(JsonValue::Array(list)) => list,
        _ => Vec::new(),
    };

    if verb.eq_ignore_ascii_case("get") {
        for param in parameters.iter_mut().filter(|p| is_body(p)) {
            param["in"] = json!("query");
        }
    }

    if let Some(file) = parameters.iter().find(|p| is_file(p)).cloned() {
        parameters.retain(|p| p != &file);
        let mut body = JsonMap::new();
        if let Some(description) = file.get("description") {
            body.insert("description".into(), description.clone());
        }
        body.insert(
            "content".into(),
            json!({ BINARY_MEDIA_TYPE: { "schema": { "type": "string", "format": "binary" } } }),
        );
        body.insert(
            "required".into(),
            file.get("required").cloned().unwrap_or(json!(false)),
        );
        op.insert("requestBody".into(), JsonValue::Object(body));
    }

    if let Some(payload) = parameters.iter().find(|p| is_body(p)).cloned() {
        parameters.retain(|p| p != &payload);
        let mut body = JsonMap::new();
        if let Some(description) = payload.get("description") {
            body.insert("description".into(), description.clone());
        }
        if let Some(schema) = payload.get("schema") {
            body.insert(
                "content".into(),
                JsonValue::Object(content_for(consumes.as_ref(), schema)),
            );
        }
        if let Some(required) = payload.get("required") {
            body.insert("required".into(), required.clone());
        }
        op.insert("requestBody".into(), JsonValue::Object(body));
    }

    for param in parameters.iter_mut() {
        if let JsonValue::Object(fields) = param {
            nest_schema(fields);
        }
    }
    if !parameters.is_empty() {
        op.insert("parameters".into(), JsonValue::Array(parameters));
    }

    if let Some(JsonValue::Object(responses)) = op.get_mut("responses") {
        for response in responses.values_mut() {
            if let JsonValue::Object(fields) = response {
                convert_response(fields, produces.as_ref());
            }
        }
    }
}

/// Moves flat attributes into a nested `schema`; an existing `schema` (a
/// coerced body parameter) is kept.
fn nest_schema(fields: &mut JsonMap<String, JsonValue>) {
    fields.remove("collectionFormat");
    let mut schema = match fields.remove("schema") {
        Some(JsonValue::Object(existing)) => existing,
        _ => JsonMap::new(),
    };
    for key in FLAT_SCHEMA_KEYS {
        if let Some(value) = fields.remove(*key) {
            schema.entry(key.to_string()).or_insert(value);
        }
    }
    fields.insert("schema".into(), JsonValue::Object(schema));
}

fn convert_response(fields: &mut JsonMap<String, JsonValue>, produces: Option<&JsonValue>) {
    let schema = fields.remove("schema");
    let examples = fields.remove("examples");

    let mut content = match &schema {
        Some(schema) => content_for(produces, schema),
        None => JsonMap::new(),
    };
    if let Some(JsonValue::Object(examples)) = examples {
        for (media_type, example) in examples {
            let entry = content
                .entry(media_type)
                .or_insert_with(|| JsonValue::Object(JsonMap::new()));
            if let JsonValue::Object(entry) = entry {
                entry.insert("example".into(), example);
            }
        }
    }
    if !content.is_empty() {
        fields.insert("content".into(), JsonValue::Object(content));
    }

    if let Some(JsonValue::Object(headers)) = fields.remove("headers") {
        let wrapped: JsonMap<String, JsonValue> = headers
            .into_iter()
            .map(|(name, schema)| (name, json!({ "schema": schema })))
            .collect();
        fields.insert("headers".into(), JsonValue::Object(wrapped));
    }
}

/// Strips the generic brackets of a mangled name.
pub fn strip_mangling(name: &str) -> String {
    name.chars().filter(|c| *c != '«' && *c != '»').collect()
}

/// Rewrites reference anchors and strips mangling brackets from every key
/// and string value.
fn rewrite_anchors(value: &mut JsonValue) {
    match value {
        JsonValue::String(s) => {
            if let Some(name) = s.strip_prefix(DEFINITIONS_PREFIX) {
                *s = format!("{}{}", COMPONENTS_PREFIX, strip_mangling(name));
            } else if s.contains(|c: char| c == '«' || c == '»') {
                *s = strip_mangling(s);
            }
        }
        JsonValue::Array(items) => items.iter_mut().for_each(rewrite_anchors),
        JsonValue::Object(map) => {
            let entries = std::mem::take(map);
            for (key, mut child) in entries {
                rewrite_anchors(&mut child);
                map.insert(strip_mangling(&key), child);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::assembler::security_definitions;
    use crate::document::model::{HttpVerb, Operation, ParamLocation, Parameter, PathItem, Response};
    use crate::schema::{PrimitiveSchema, PrimitiveType, Schema};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn document_with(verb: HttpVerb, operation: Operation) -> ApiDocument {
        let mut doc = ApiDocument::new("Shop", "1.0");
        doc.host = "api.shop.io".into();
        doc.base_path = "/v1".into();
        doc.schemes = vec!["http".into(), "https".into()];
        let mut item = PathItem::new();
        item.insert(verb, operation);
        doc.paths.insert("/pets".into(), item);
        doc
    }

    fn body_param(schema: Schema) -> Parameter {
        Parameter {
            name: "pet".into(),
            location: ParamLocation::Body,
            description: Some("the pet".into()),
            required: true,
            schema,
            default: None,
        }
    }

    #[test]
    fn test_servers() {
        let doc = document_with(HttpVerb::Get, Operation::default());
        let out = to_openapi(&doc).unwrap();
        assert_eq!(out["openapi"], json!("3.0.0"));
        assert_eq!(
            out["servers"],
            json!([{"url": "http://api.shop.io/v1"}, {"url": "https://api.shop.io/v1"}])
        );

        let mut bare = ApiDocument::new("Shop", "1.0");
        bare.schemes.clear();
        let out = to_openapi(&bare).unwrap();
        assert_eq!(out["servers"], json!([{"url": "http://localhost"}]));
    }

    #[test]
    fn test_body_becomes_request_body() {
        let op = Operation {
            consumes: vec!["application/json".into()],
            parameters: vec![body_param(Schema::reference("Pet"))],
            ..Default::default()
        };
        let out = to_openapi(&document_with(HttpVerb::Post, op)).unwrap();
        let post = &out["paths"]["/pets"]["post"];
        assert_eq!(
            post["requestBody"],
            json!({
                "description": "the pet",
                "content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}
                },
                "required": true
            })
        );
        assert!(post.get("parameters").is_none());
        assert!(post.get("consumes").is_none());
    }

    #[test]
    fn test_body_without_consumes_defaults_to_json() {
        let op = Operation {
            parameters: vec![body_param(Schema::reference("Pet"))],
            ..Default::default()
        };
        let out = to_openapi(&document_with(HttpVerb::Put, op)).unwrap();
        let content = out["paths"]["/pets"]["put"]["requestBody"]["content"]
            .as_object()
            .unwrap();
        let keys: Vec<_> = content.keys().cloned().collect();
        assert_eq!(keys, vec!["application/json"]);
    }

    #[test]
    fn test_file_and_body_both_extracted() {
        let file = Parameter {
            name: "upload".into(),
            location: ParamLocation::FormData,
            description: None,
            required: true,
            schema: Schema::Primitive(PrimitiveSchema::new(PrimitiveType::File)),
            default: None,
        };
        let limit = Parameter {
            name: "limit".into(),
            location: ParamLocation::Query,
            description: None,
            required: false,
            schema: Schema::Primitive(PrimitiveSchema::new(PrimitiveType::Integer).format("int32")),
            default: Some(json!("10")),
        };
        let op = Operation {
            parameters: vec![file, body_param(Schema::reference("Pet")), limit],
            ..Default::default()
        };
        let out = to_openapi(&document_with(HttpVerb::Post, op)).unwrap();
        let post = &out["paths"]["/pets"]["post"];
        assert!(post["requestBody"]["content"].get("application/json").is_some());
        assert_eq!(
            post["parameters"],
            json!([{
                "name": "limit",
                "in": "query",
                "required": false,
                "schema": {"type": "integer", "format": "int32", "default": "10"}
            }])
        );
    }

    #[test]
    fn test_file_upload_is_binary() {
        let file = Parameter {
            name: "upload".into(),
            location: ParamLocation::FormData,
            description: Some("archive".into()),
            required: true,
            schema: Schema::Primitive(PrimitiveSchema::new(PrimitiveType::File)),
            default: None,
        };
        let op = Operation {
            parameters: vec![file],
            ..Default::default()
        };
        let out = to_openapi(&document_with(HttpVerb::Post, op)).unwrap();
        assert_eq!(
            out["paths"]["/pets"]["post"]["requestBody"],
            json!({
                "description": "archive",
                "content": {
                    "application/octet-stream": {"schema": {"type": "string", "format": "binary"}}
                },
                "required": true
            })
        );
    }

    #[test]
    fn test_get_body_is_coerced_to_query() {
        let op = Operation {
            parameters: vec![body_param(Schema::reference("Pet"))],
            ..Default::default()
        };
        let out = to_openapi(&document_with(HttpVerb::Get, op)).unwrap();
        let get = &out["paths"]["/pets"]["get"];
        assert!(get.get("requestBody").is_none());
        assert_eq!(get["parameters"][0]["in"], json!("query"));
        assert_eq!(
            get["parameters"][0]["schema"],
            json!({"$ref": "#/components/schemas/Pet"})
        );
    }

    #[test]
    fn test_responses_and_headers() {
        let mut headers = IndexMap::new();
        headers.insert("X-Rate".to_string(), Schema::string());
        let mut examples = IndexMap::new();
        examples.insert("application/xml".to_string(), json!("<pet/>"));
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "ok".into(),
                schema: Some(Schema::array(Schema::reference("Page«Pet»"))),
                examples,
                headers,
            },
        );
        let op = Operation {
            produces: vec!["application/json".into(), "application/xml".into()],
            responses,
            ..Default::default()
        };
        let out = to_openapi(&document_with(HttpVerb::Get, op)).unwrap();
        let ok = &out["paths"]["/pets"]["get"]["responses"]["200"];
        let items = json!({"type": "array", "items": {"$ref": "#/components/schemas/PagePet"}});
        assert_eq!(ok["content"]["application/json"], json!({"schema": items}));
        assert_eq!(ok["content"]["application/xml"]["example"], json!("<pet/>"));
        assert_eq!(ok["headers"], json!({"X-Rate": {"schema": {"type": "string"}}}));
        assert!(ok.get("schema").is_none());
    }

    #[test]
    fn test_components() {
        let mut doc = document_with(HttpVerb::Get, Operation::default());
        doc.definitions.insert(
            "Page«Pet»".into(),
            Schema::map(Schema::reference("Pet")),
        );
        doc.security_definitions = security_definitions();
        let out = to_openapi(&doc).unwrap();
        let schemas = out["components"]["schemas"].as_object().unwrap();
        assert!(schemas.contains_key("PagePet"));
        assert_eq!(
            schemas["PagePet"]["additionalProperties"],
            json!({"$ref": "#/components/schemas/Pet"})
        );

        let security = &out["components"]["securitySchemes"];
        assert_eq!(security["api_key"]["type"], json!("apiKey"));
        assert_eq!(security["api_key"]["in"], json!("header"));
        assert_eq!(security["basic"], json!({"type": "http", "scheme": "basic"}));
        assert_eq!(
            security["oauth2"]["flows"]["implicit"]["authorizationUrl"],
            json!("http://petstore.swagger.io/oauth/dialog")
        );
        assert_eq!(
            security["oauth2"]["flows"]["implicit"]["scopes"]["read:pets"],
            json!("read your pets")
        );
    }

    #[test]
    fn test_strip_mangling() {
        assert_eq!(strip_mangling("Page«List«User»»"), "PageListUser");
        assert_eq!(strip_mangling("User"), "User");
    }
}
