//! # Example Materializer
//!
//! Synthesizes example values from schemas for the mock facility.
//!
//! Recursion is bounded twice: by a depth limit and by the set of reference
//! names currently being expanded. Either bound emits a `$ref` marker in place
//! of the nested value (or `null` for an anonymous shape past the limit), so
//! self-referential schemas always terminate.

use crate::schema::model::DEFINITIONS_PREFIX;
use crate::schema::primitives::{DATE_EXAMPLE, DATE_TIME_EXAMPLE, TIME_EXAMPLE};
use crate::schema::{PrimitiveSchema, PrimitiveType, Schema};
use base64::Engine;
use indexmap::IndexMap;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

/// Default recursion limit.
pub const DEFAULT_DEPTH: usize = 5;

/// Number of generated array items and map entries.
pub const COLLECTION_SIZE: usize = 3;

const FIRST_NAMES: &[&str] = &["Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret", "Dennis"];
const LAST_NAMES: &[&str] = &["Lovelace", "Hopper", "Torvalds", "Liskov", "Thompson", "Hamilton"];
const COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "teal", "blue", "indigo", "violet", "black", "white",
];
const INSTRUMENTS: &[&str] = &["Piano", "Guitar", "Cello", "Trumpet", "Drums", "Flute"];
const CITIES: &[&str] = &["Lisbon", "Osaka", "Toronto", "Nairobi", "Oslo", "Santiago"];
const COUNTRIES: &[&str] = &["Portugal", "Japan", "Canada", "Kenya", "Norway", "Chile"];
const STREETS: &[&str] = &["Maple", "Harbor", "Station", "Orchard", "Mill", "Church"];
const COMPANIES: &[&str] = &["Initech", "Globex", "Umbrella", "Hooli", "Stark Industries"];
const FILE_STEMS: &[&str] = &["report", "invoice", "avatar", "export", "notes"];
const FILE_EXTENSIONS: &[&str] = &["pdf", "png", "csv", "txt", "zip"];

/// Produces example values for schemas that may reference `definitions`.
pub struct ExampleMaterializer<'a, R: Rng = ThreadRng> {
    definitions: &'a IndexMap<String, Schema>,
    max_depth: usize,
    rng: R,
    active: Vec<String>,
}

impl<'a> ExampleMaterializer<'a, ThreadRng> {
    /// A materializer drawing from the thread-local generator.
    pub fn new(definitions: &'a IndexMap<String, Schema>, max_depth: usize) -> Self {
        Self::with_rng(definitions, max_depth, rand::thread_rng())
    }
}

impl<'a, R: Rng> ExampleMaterializer<'a, R> {
    /// A materializer drawing from `rng`.
    pub fn with_rng(definitions: &'a IndexMap<String, Schema>, max_depth: usize, rng: R) -> Self {
        Self {
            definitions,
            max_depth,
            rng,
            active: Vec::new(),
        }
    }

    /// An example value for `schema`.
    pub fn materialize(&mut self, schema: &Schema) -> JsonValue {
        self.active.clear();
        self.value(None, schema, 0)
    }

    fn value(&mut self, field: Option<&str>, schema: &Schema, depth: usize) -> JsonValue {
        if let Some(example) = schema.example() {
            return example.clone();
        }
        let definitions = self.definitions;
        match schema {
            Schema::Primitive(p) => self.primitive(field, p),
            Schema::Enum(e) => e
                .values
                .choose(&mut self.rng)
                .map(|v| JsonValue::String(v.clone()))
                .unwrap_or(JsonValue::Null),
            Schema::Array { items, .. } => {
                if depth >= self.max_depth {
                    return JsonValue::Null;
                }
                (0..COLLECTION_SIZE)
                    .map(|_| self.value(None, items, depth + 1))
                    .collect()
            }
            Schema::Map { values, .. } => {
                if depth >= self.max_depth {
                    return JsonValue::Null;
                }
                let keys: Vec<&str> = COLORS
                    .choose_multiple(&mut self.rng, COLLECTION_SIZE)
                    .copied()
                    .collect();
                let mut out = JsonMap::new();
                for key in keys {
                    let value = self.value(None, values, depth + 1);
                    out.insert(key.to_string(), value);
                }
                JsonValue::Object(out)
            }
            Schema::Object(o) => match &o.name {
                Some(name) => self.named(name, schema, depth),
                None if depth >= self.max_depth => JsonValue::Null,
                None => self.properties(&o.properties, depth),
            },
            Schema::Reference { name, .. } => match definitions.get(name) {
                Some(definition) => {
                    if let Some(example) = definition.example() {
                        return example.clone();
                    }
                    self.named(name, definition, depth)
                }
                None => {
                    tracing::debug!(name = %name, "example for unknown definition");
                    JsonValue::Object(JsonMap::new())
                }
            },
        }
    }

    /// Expands a named shape unless it is already being expanded or the
    /// depth limit is reached.
    fn named(&mut self, name: &str, schema: &Schema, depth: usize) -> JsonValue {
        if depth >= self.max_depth || self.active.iter().any(|a| a == name) {
            return json!({ "$ref": format!("{}{}", DEFINITIONS_PREFIX, name) });
        }
        self.active.push(name.to_string());
        let value = match schema {
            Schema::Object(o) => self.properties(&o.properties, depth),
            other => self.value(None, other, depth),
        };
        self.active.pop();
        value
    }

    fn properties(&mut self, properties: &IndexMap<String, Schema>, depth: usize) -> JsonValue {
        let mut out = JsonMap::new();
        for (key, schema) in properties {
            let value = self.value(Some(key), schema, depth + 1);
            out.insert(key.clone(), value);
        }
        JsonValue::Object(out)
    }

    fn primitive(&mut self, field: Option<&str>, p: &PrimitiveSchema) -> JsonValue {
        match p.ty {
            PrimitiveType::Integer => json!(self.rng.gen_range(0..1000)),
            PrimitiveType::Number => {
                let n: f64 = self.rng.gen_range(10.0..100.0);
                json!((n * 100.0).round() / 100.0)
            }
            PrimitiveType::Boolean => json!(self.rng.gen_bool(0.5)),
            PrimitiveType::File => json!(format!(
                "{}.{}",
                self.pick(FILE_STEMS),
                self.pick(FILE_EXTENSIONS)
            )),
            PrimitiveType::String => match p.format.as_deref() {
                Some("date-time") => json!(DATE_TIME_EXAMPLE),
                Some("date") => json!(DATE_EXAMPLE),
                Some("time") => json!(TIME_EXAMPLE),
                Some("byte") | Some("binary") => {
                    let payload: Vec<u8> = (0..8).map(|_| self.rng.gen()).collect();
                    json!(base64::engine::general_purpose::STANDARD.encode(payload))
                }
                Some("uuid") => json!(self.uuid()),
                _ => self.fake(field),
            },
        }
    }

    /// Field-name keyed heuristics; a full name for anything else.
    fn fake(&mut self, field: Option<&str>) -> JsonValue {
        let text = match field.unwrap_or_default() {
            "firstName" => self.pick(FIRST_NAMES).to_string(),
            "lastName" => self.pick(LAST_NAMES).to_string(),
            "email" => format!("{}@example.com", self.rng.gen_range(0..10)),
            "username" => format!(
                "{}.{}",
                self.pick(FIRST_NAMES).to_lowercase(),
                self.rng.gen_range(10..100)
            ),
            "phone" | "mobile" => format!(
                "+1-555-{:03}-{:04}",
                self.rng.gen_range(100..1000),
                self.rng.gen_range(0..10000)
            ),
            "music" => self.pick(INSTRUMENTS).to_string(),
            "color" => self.pick(COLORS).to_string(),
            "address" => format!(
                "{} {} Street, {}",
                self.rng.gen_range(1..500),
                self.pick(STREETS),
                self.pick(CITIES)
            ),
            "city" => self.pick(CITIES).to_string(),
            "country" => self.pick(COUNTRIES).to_string(),
            "state" => return json!(self.rng.gen_range(0..10)),
            "company" => self.pick(COMPANIES).to_string(),
            "avatar" | "url" => format!(
                "https://example.com/{}.png",
                self.pick(COMPANIES).to_lowercase().replace(' ', "-")
            ),
            _ => format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES)),
        };
        JsonValue::String(text)
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn uuid(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}
