//! # Model Materializer
//!
//! Turns registry entries into persisted definitions: named nested objects
//! become references, anonymous shapes stay inline.

use crate::schema::model::{ObjectSchema, Schema};
use indexmap::IndexMap;

/// Converts one registry entry into its definition form.
pub fn to_model(schema: &Schema) -> Schema {
    match schema {
        Schema::Object(object) => Schema::Object(ObjectSchema {
            properties: object
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), nested(v)))
                .collect(),
            ..object.clone()
        }),
        other => nested_children(other),
    }
}

/// Converts every entry of a registry snapshot.
pub fn definitions(entries: &IndexMap<String, Schema>) -> IndexMap<String, Schema> {
    entries
        .iter()
        .map(|(name, schema)| (name.clone(), to_model(schema)))
        .collect()
}

fn nested(schema: &Schema) -> Schema {
    match schema {
        Schema::Object(ObjectSchema {
            name: Some(name), ..
        }) => Schema::reference(name.clone()),
        Schema::Object(_) => to_model(schema),
        other => nested_children(other),
    }
}

fn nested_children(schema: &Schema) -> Schema {
    match schema {
        Schema::Array {
            items,
            unique_items,
            description,
        } => Schema::Array {
            items: Box::new(nested(items)),
            unique_items: *unique_items,
            description: description.clone(),
        },
        Schema::Map {
            values,
            description,
        } => Schema::Map {
            values: Box::new(nested(values)),
            description: description.clone(),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{EnumSchema, PrimitiveSchema, PrimitiveType};

    fn named(name: &str) -> Schema {
        let mut o = ObjectSchema {
            name: Some(name.into()),
            ..Default::default()
        };
        o.properties.insert(
            "id".into(),
            Schema::Primitive(PrimitiveSchema::new(PrimitiveType::Integer)),
        );
        Schema::Object(o)
    }

    #[test]
    fn test_named_children_become_references() {
        let mut order = ObjectSchema {
            name: Some("Order".into()),
            ..Default::default()
        };
        order.properties.insert("buyer".into(), named("User"));
        order.properties.insert("items".into(), Schema::array(named("Item")));
        order.properties.insert("meta".into(), Schema::map(Schema::untyped()));

        let Schema::Object(model) = to_model(&Schema::Object(order)) else {
            panic!("expected object");
        };
        assert_eq!(model.properties["buyer"], Schema::reference("User"));
        assert_eq!(model.properties["items"], Schema::array(Schema::reference("Item")));
        assert_eq!(model.properties["meta"], Schema::map(Schema::untyped()));
    }

    #[test]
    fn test_enum_entry_stays_enum() {
        let status = Schema::Enum(EnumSchema {
            name: Some("Status".into()),
            values: vec!["A".into()],
            description: None,
        });
        assert_eq!(to_model(&status), status);
    }
}
