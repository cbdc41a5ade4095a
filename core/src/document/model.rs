//! # API Document
//!
//! The assembled path/operation/schema aggregate of one project, with serde
//! impls producing the source dialect (Swagger 2.0) wire shape.

use crate::error::AppError;
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpVerb {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
}

impl HttpVerb {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Put => "put",
            HttpVerb::Post => "post",
            HttpVerb::Delete => "delete",
            HttpVerb::Options => "options",
            HttpVerb::Head => "head",
            HttpVerb::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for HttpVerb {
    type Err = AppError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpVerb::Get),
            "put" => Ok(HttpVerb::Put),
            "post" => Ok(HttpVerb::Post),
            "delete" => Ok(HttpVerb::Delete),
            "options" => Ok(HttpVerb::Options),
            "head" => Ok(HttpVerb::Head),
            "patch" => Ok(HttpVerb::Patch),
            other => Err(AppError::General(format!("Unknown HTTP method '{}'", other))),
        }
    }
}

impl Serialize for HttpVerb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpVerb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a parameter is bound in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    /// Query string.
    Query,
    /// Path template segment.
    Path,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
    /// Form field.
    FormData,
    /// Request body.
    Body,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub struct Parameter {
    /// External name.
    pub name: String,
    /// Binding location.
    pub location: ParamLocation,
    /// Human-readable description.
    pub description: Option<String>,
    /// Whether the caller must supply it.
    pub required: bool,
    /// Value schema. Flattened into the parameter unless bound to the body.
    pub schema: Schema,
    /// Default value.
    pub default: Option<JsonValue>,
}

impl From<Parameter> for JsonValue {
    fn from(p: Parameter) -> Self {
        let mut out = JsonMap::new();
        out.insert("name".into(), JsonValue::String(p.name));
        out.insert(
            "in".into(),
            serde_json::to_value(p.location).unwrap_or(JsonValue::Null),
        );
        if let Some(description) = p.description {
            out.insert("description".into(), JsonValue::String(description));
        }
        out.insert("required".into(), JsonValue::Bool(p.required));

        let schema = serde_json::to_value(p.schema).unwrap_or(JsonValue::Null);
        if p.location == ParamLocation::Body {
            out.insert("schema".into(), schema);
        } else if let JsonValue::Object(flat) = schema {
            for (key, value) in flat {
                if key != "description" && key != "title" {
                    out.entry(key).or_insert(value);
                }
            }
        }
        if let Some(default) = p.default {
            out.insert("default".into(), default);
        }
        JsonValue::Object(out)
    }
}

impl TryFrom<JsonValue> for Parameter {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let JsonValue::Object(mut map) = value else {
            return Err("parameter must be an object".to_string());
        };
        let name = match map.remove("name") {
            Some(JsonValue::String(s)) => s,
            _ => return Err("parameter without name".to_string()),
        };
        let location: ParamLocation = map
            .remove("in")
            .ok_or_else(|| format!("parameter '{}' without location", name))
            .and_then(|v| serde_json::from_value(v).map_err(|e| e.to_string()))?;
        let description = match map.remove("description") {
            Some(JsonValue::String(s)) => Some(s),
            _ => None,
        };
        let required = map
            .remove("required")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let default = map.remove("default");

        let schema_value = if location == ParamLocation::Body {
            map.remove("schema").unwrap_or_else(|| JsonValue::Object(JsonMap::new()))
        } else {
            JsonValue::Object(map)
        };
        let schema = serde_json::from_value(schema_value).map_err(|e| e.to_string())?;

        Ok(Parameter {
            name,
            location,
            description,
            required,
            schema,
            default,
        })
    }
}

/// A response of an operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    /// Human-readable description (required by the dialect, may be empty).
    #[serde(default)]
    pub description: String,
    /// Response body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Literal examples keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, JsonValue>,
    /// Response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Schema>,
}

/// A single operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags (controller names).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// One-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation id (method name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Accepted request media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Produced response media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    /// Parameters in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

/// Operations of one path template keyed by verb.
pub type PathItem = IndexMap<HttpVerb, Operation>;

/// A controller tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Tag description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A security scheme of the source dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityDefinition {
    /// An API key.
    #[serde(rename = "apiKey")]
    ApiKey {
        /// Header or query parameter name.
        name: String,
        /// `header` or `query`.
        #[serde(rename = "in")]
        location: String,
    },
    /// OAuth 2.
    #[serde(rename = "oauth2")]
    OAuth2 {
        /// `implicit`, `password`, `application` or `accessCode`.
        flow: String,
        /// Authorization endpoint.
        #[serde(
            rename = "authorizationUrl",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        authorization_url: Option<String>,
        /// Token endpoint.
        #[serde(rename = "tokenUrl", default, skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
        /// Scope name to description.
        #[serde(default)]
        scopes: IndexMap<String, String>,
    },
    /// HTTP basic.
    #[serde(rename = "basic")]
    Basic,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API version.
    pub version: String,
}

/// The API document of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocument {
    /// Dialect marker, always `2.0`.
    pub swagger: String,
    /// Metadata.
    pub info: Info,
    /// Host (`api.example.com:8080`).
    #[serde(default)]
    pub host: String,
    /// Base path (`/v1`).
    #[serde(default)]
    pub base_path: String,
    /// Transfer schemes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    /// Controller tags, every one referenced by an operation once finalized.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Path template to verb to operation.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Security schemes by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_definitions: IndexMap<String, SecurityDefinition>,
    /// Named schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
}

impl ApiDocument {
    /// An empty document.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            swagger: "2.0".to_string(),
            info: Info {
                title: title.into(),
                description: None,
                version: version.into(),
            },
            host: String::new(),
            base_path: "/".to_string(),
            schemes: Vec::new(),
            tags: Vec::new(),
            paths: IndexMap::new(),
            security_definitions: IndexMap::new(),
            definitions: IndexMap::new(),
        }
    }

    /// Parses a source dialect document.
    pub fn from_json(content: &str) -> crate::error::AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Looks up an operation.
    pub fn operation(&self, path: &str, verb: HttpVerb) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(&verb))
    }

    /// Number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.len()).sum()
    }
}
