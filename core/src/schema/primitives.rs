//! # Primitive Table
//!
//! Well-known scalar and untyped-JSON types that short-circuit resolution.

use crate::schema::model::{PrimitiveSchema, PrimitiveType, Schema};

/// Example literal for date values.
pub const DATE_EXAMPLE: &str = "2018-09-10";
/// Example literal for time values.
pub const TIME_EXAMPLE: &str = "13:11:43";
/// Example literal for timestamp values.
pub const DATE_TIME_EXAMPLE: &str = "2018-09-10T13:11:43Z";

/// Looks up a canonical qualified name (or a language primitive).
pub fn lookup(name: &str) -> Option<Schema> {
    use PrimitiveType::*;
    let p = match name {
        "int" | "java.lang.Integer" | "short" | "java.lang.Short" | "java.math.BigInteger" => {
            PrimitiveSchema::new(Integer).format("int32")
        }
        "long" | "java.lang.Long" => PrimitiveSchema::new(Integer).format("int64"),
        "double" | "java.lang.Double" | "java.math.BigDecimal" => {
            PrimitiveSchema::new(Number).format("double")
        }
        "float" | "java.lang.Float" => PrimitiveSchema::new(Number).format("float"),
        "boolean" | "java.lang.Boolean" => PrimitiveSchema::new(Boolean),
        "byte" | "java.lang.Byte" => PrimitiveSchema::new(String).format("byte"),
        "byte[]" | "java.lang.Byte[]" => PrimitiveSchema::new(String).format("byte"),
        "java.lang.String" | "java.lang.CharSequence" | "char" | "java.lang.Character" => {
            PrimitiveSchema::new(String)
        }
        "java.time.LocalDate" | "org.joda.time.LocalDate" => {
            PrimitiveSchema::new(String).format("date").example(DATE_EXAMPLE)
        }
        "java.time.LocalTime" | "org.joda.time.LocalTime" => {
            PrimitiveSchema::new(String).format("time").example(TIME_EXAMPLE)
        }
        "java.util.Date"
        | "java.sql.Timestamp"
        | "java.time.LocalDateTime"
        | "java.time.ZonedDateTime"
        | "java.time.OffsetDateTime"
        | "java.time.Instant"
        | "org.joda.time.LocalDateTime"
        | "org.joda.time.DateTime" => PrimitiveSchema::new(String)
            .format("date-time")
            .example(DATE_TIME_EXAMPLE),
        "org.springframework.web.multipart.MultipartFile" => PrimitiveSchema::new(File),
        "java.util.UUID" => PrimitiveSchema::new(String).format("uuid"),
        "com.alibaba.fastjson.JSONObject"
        | "com.google.gson.JsonObject"
        | "com.fasterxml.jackson.databind.node.ObjectNode" => {
            return Some(Schema::map(Schema::untyped()))
        }
        "com.alibaba.fastjson.JSONArray"
        | "com.google.gson.JsonArray"
        | "com.fasterxml.jackson.databind.node.ArrayNode" => {
            return Some(Schema::array(Schema::untyped()))
        }
        _ => return None,
    };
    Some(Schema::Primitive(p))
}

/// Looks up a bare simple name for types the frontend did not qualify.
pub fn lookup_simple(simple: &str) -> Option<Schema> {
    let qualified = match simple {
        "Integer" | "Short" | "Long" | "Double" | "Float" | "Boolean" | "Byte" | "String"
        | "CharSequence" | "Character" => format!("java.lang.{}", simple),
        "Byte[]" => "java.lang.Byte[]".to_string(),
        "BigInteger" | "BigDecimal" => format!("java.math.{}", simple),
        "LocalDate" | "LocalTime" | "LocalDateTime" | "ZonedDateTime" | "OffsetDateTime"
        | "Instant" => format!("java.time.{}", simple),
        "Date" | "UUID" => format!("java.util.{}", simple),
        "Timestamp" => "java.sql.Timestamp".to_string(),
        "MultipartFile" => "org.springframework.web.multipart.MultipartFile".to_string(),
        "JSONObject" | "JSONArray" => format!("com.alibaba.fastjson.{}", simple),
        "JsonObject" | "JsonArray" => format!("com.google.gson.{}", simple),
        "ObjectNode" | "ArrayNode" => format!("com.fasterxml.jackson.databind.node.{}", simple),
        _ => return None,
    };
    lookup(&qualified)
}
