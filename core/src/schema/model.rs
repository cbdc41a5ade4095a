//! # Schema Model
//!
//! The normalized structural description of a type, serialized in the
//! source dialect's wire shape (`type`/`format`/`items`/`$ref`).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Anchor prefix of definition references in the source dialect.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Scalar kinds of the source dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `file` (multipart upload)
    File,
}

impl PrimitiveType {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::File => "file",
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "string" => Some(PrimitiveType::String),
            "integer" => Some(PrimitiveType::Integer),
            "number" => Some(PrimitiveType::Number),
            "boolean" => Some(PrimitiveType::Boolean),
            "file" => Some(PrimitiveType::File),
            _ => None,
        }
    }
}

/// A scalar schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    /// Scalar kind.
    pub ty: PrimitiveType,
    /// Format qualifier (`int64`, `date-time`, `uuid`).
    pub format: Option<String>,
    /// Canonical example literal.
    pub example: Option<JsonValue>,
    /// Default value.
    pub default: Option<JsonValue>,
    /// Human-readable description.
    pub description: Option<String>,
}

impl PrimitiveSchema {
    /// A scalar with no format.
    pub fn new(ty: PrimitiveType) -> Self {
        Self {
            ty,
            format: None,
            example: None,
            default: None,
            description: None,
        }
    }

    /// Sets the format qualifier.
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Sets the example literal.
    pub fn example(mut self, example: &str) -> Self {
        self.example = Some(JsonValue::String(example.to_string()));
        self
    }
}

/// An enumerated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    /// Declared (simple) enum name; `None` for inline enums read from a document.
    pub name: Option<String>,
    /// Constant names in declaration order.
    pub values: Vec<String>,
    /// Concatenated constant documentation.
    pub description: Option<String>,
}

/// A structured object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Registry name; only set when derived from a named declared type.
    pub name: Option<String>,
    /// Properties in insertion order.
    pub properties: IndexMap<String, Schema>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Names of required properties.
    pub required: IndexSet<String>,
}

/// A node of the schema graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A scalar.
    Primitive(PrimitiveSchema),
    /// An array of `items`.
    Array {
        /// Element schema.
        items: Box<Schema>,
        /// Set semantics.
        unique_items: bool,
        /// Human-readable description.
        description: Option<String>,
    },
    /// A string-keyed map of `values`.
    Map {
        /// Value schema.
        values: Box<Schema>,
        /// Human-readable description.
        description: Option<String>,
    },
    /// An enumerated string.
    Enum(EnumSchema),
    /// A structured object.
    Object(ObjectSchema),
    /// A pointer to a registry entry.
    Reference {
        /// Registry name (possibly mangled).
        name: String,
        /// Human-readable description attached at the use site.
        description: Option<String>,
    },
}

impl Default for Schema {
    fn default() -> Self {
        Schema::untyped()
    }
}

impl Schema {
    /// An anonymous object with no properties.
    pub fn untyped() -> Self {
        Schema::Object(ObjectSchema::default())
    }

    /// A plain string.
    pub fn string() -> Self {
        Schema::Primitive(PrimitiveSchema::new(PrimitiveType::String))
    }

    /// A reference to a registry entry.
    pub fn reference(name: impl Into<String>) -> Self {
        Schema::Reference {
            name: name.into(),
            description: None,
        }
    }

    /// An array of `items`.
    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
            unique_items: false,
            description: None,
        }
    }

    /// A map of `values`.
    pub fn map(values: Schema) -> Self {
        Schema::Map {
            values: Box::new(values),
            description: None,
        }
    }

    /// The registry name of a named object or enum.
    pub fn name(&self) -> Option<&str> {
        match self {
            Schema::Object(o) => o.name.as_deref(),
            Schema::Enum(e) => e.name.as_deref(),
            _ => None,
        }
    }

    /// Object, map, or reference: shapes that bind as a request body.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            Schema::Object(_) | Schema::Map { .. } | Schema::Reference { .. }
        )
    }

    /// The description, whatever the kind.
    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::Primitive(p) => p.description.as_deref(),
            Schema::Array { description, .. }
            | Schema::Map { description, .. }
            | Schema::Reference { description, .. } => description.as_deref(),
            Schema::Enum(e) => e.description.as_deref(),
            Schema::Object(o) => o.description.as_deref(),
        }
    }

    /// Replaces the description.
    pub fn set_description(&mut self, text: Option<String>) {
        match self {
            Schema::Primitive(p) => p.description = text,
            Schema::Array { description, .. }
            | Schema::Map { description, .. }
            | Schema::Reference { description, .. } => *description = text,
            Schema::Enum(e) => e.description = text,
            Schema::Object(o) => o.description = text,
        }
    }

    /// Returns the schema with its description replaced.
    pub fn with_description(mut self, text: Option<String>) -> Self {
        self.set_description(text);
        self
    }

    /// The literal example of a primitive schema.
    pub fn example(&self) -> Option<&JsonValue> {
        match self {
            Schema::Primitive(p) => p.example.as_ref(),
            _ => None,
        }
    }

    /// The use-site form of this schema: a named object becomes a reference.
    pub fn as_use_site(&self) -> Schema {
        match self {
            Schema::Object(ObjectSchema {
                name: Some(name), ..
            }) => Schema::reference(name.clone()),
            other => other.clone(),
        }
    }
}

/// Wire form of a schema in the source dialect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawSchema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<RawSchema>>,
    #[serde(rename = "uniqueItems", default, skip_serializing_if = "Option::is_none")]
    unique_items: Option<bool>,
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    additional_properties: Option<Box<RawSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<IndexMap<String, RawSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<Vec<String>>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    example: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<JsonValue>,
}

impl From<Schema> for RawSchema {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::Primitive(p) => RawSchema {
                ty: Some(p.ty.as_str().to_string()),
                format: p.format,
                example: p.example,
                default: p.default,
                description: p.description,
                ..Default::default()
            },
            Schema::Array {
                items,
                unique_items,
                description,
            } => RawSchema {
                ty: Some("array".to_string()),
                items: Some(Box::new((*items).into())),
                unique_items: unique_items.then_some(true),
                description,
                ..Default::default()
            },
            Schema::Map {
                values,
                description,
            } => RawSchema {
                ty: Some("object".to_string()),
                additional_properties: Some(Box::new((*values).into())),
                description,
                ..Default::default()
            },
            Schema::Enum(e) => RawSchema {
                ty: Some("string".to_string()),
                title: e.name,
                enum_values: Some(e.values),
                description: e.description,
                ..Default::default()
            },
            Schema::Object(o) => RawSchema {
                ty: Some("object".to_string()),
                title: o.name,
                description: o.description,
                required: (!o.required.is_empty()).then(|| o.required.into_iter().collect()),
                properties: (!o.properties.is_empty()).then(|| {
                    o.properties
                        .into_iter()
                        .map(|(k, v)| (k, v.into()))
                        .collect()
                }),
                ..Default::default()
            },
            Schema::Reference { name, description } => RawSchema {
                reference: Some(format!("{}{}", DEFINITIONS_PREFIX, name)),
                description,
                ..Default::default()
            },
        }
    }
}

impl From<RawSchema> for Schema {
    fn from(raw: RawSchema) -> Self {
        if let Some(reference) = raw.reference {
            let name = reference
                .strip_prefix(DEFINITIONS_PREFIX)
                .unwrap_or(&reference)
                .to_string();
            return Schema::Reference {
                name,
                description: raw.description,
            };
        }
        if let Some(values) = raw.enum_values {
            return Schema::Enum(EnumSchema {
                name: raw.title,
                values,
                description: raw.description,
            });
        }
        match raw.ty.as_deref() {
            Some("array") => Schema::Array {
                items: Box::new(raw.items.map(|i| (*i).into()).unwrap_or_default()),
                unique_items: raw.unique_items.unwrap_or(false),
                description: raw.description,
            },
            Some(other) if PrimitiveType::from_wire(other).is_some() => {
                let ty = PrimitiveType::from_wire(other).unwrap_or(PrimitiveType::String);
                Schema::Primitive(PrimitiveSchema {
                    ty,
                    format: raw.format,
                    example: raw.example,
                    default: raw.default,
                    description: raw.description,
                })
            }
            _ => match raw.additional_properties {
                Some(values) if raw.properties.is_none() => Schema::Map {
                    values: Box::new((*values).into()),
                    description: raw.description,
                },
                _ => Schema::Object(ObjectSchema {
                    name: raw.title,
                    properties: raw
                        .properties
                        .unwrap_or_default()
                        .into_iter()
                        .map(|(k, v)| (k, v.into()))
                        .collect(),
                    description: raw.description,
                    required: raw.required.unwrap_or_default().into_iter().collect(),
                }),
            },
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawSchema::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawSchema::deserialize(deserializer).map(Schema::from)
    }
}
