//! Structural OpenAPI v3 to JSON Schema
//!
//! CRD schemas are almost JSON Schema draft 4. Two Kubernetes extensions
//! change what a value may be and must be rewritten before compiling:
//!
//! - `nullable: true` admits `null` next to the declared type
//! - `x-kubernetes-int-or-string: true` admits an integer or a string
//!
//! Every other `x-kubernetes-*` keyword is left in place; the validator
//! ignores keywords it does not know.

use serde_json::{Map, Value, json};

const SCHEMA_MAPS: &[&str] = &["properties", "patternProperties", "definitions"];
const SCHEMA_LISTS: &[&str] = &["allOf", "anyOf", "oneOf"];
const SCHEMA_VALUES: &[&str] = &["not", "additionalProperties", "additionalItems"];

/// Convert a CRD `openAPIV3Schema` into a draft 4 JSON Schema
pub fn openapi_to_json_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(convert_object(map)),
        other => other.clone(),
    }
}

fn convert_object(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());

    for (key, value) in map {
        let converted = match key.as_str() {
            k if SCHEMA_MAPS.contains(&k) => match value {
                Value::Object(children) => Value::Object(
                    children
                        .iter()
                        .map(|(name, child)| (name.clone(), openapi_to_json_schema(child)))
                        .collect(),
                ),
                other => other.clone(),
            },
            k if SCHEMA_LISTS.contains(&k) => match value {
                Value::Array(items) => {
                    Value::Array(items.iter().map(openapi_to_json_schema).collect())
                }
                other => other.clone(),
            },
            "items" => match value {
                Value::Array(items) => {
                    Value::Array(items.iter().map(openapi_to_json_schema).collect())
                }
                other => openapi_to_json_schema(other),
            },
            k if SCHEMA_VALUES.contains(&k) => openapi_to_json_schema(value),
            // Examples and defaults are data, not schemas
            _ => value.clone(),
        };
        out.insert(key.clone(), converted);
    }

    if is_flag_set(map, "x-kubernetes-int-or-string") {
        out.remove("type");
        if !out.contains_key("anyOf") {
            out.insert(
                "anyOf".to_string(),
                json!([{ "type": "integer" }, { "type": "string" }]),
            );
        }
    }

    if is_flag_set(map, "nullable") {
        admit_null(&mut out);
    }

    out
}

fn is_flag_set(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn admit_null(schema: &mut Map<String, Value>) {
    match schema.get("type").cloned() {
        Some(Value::String(ty)) => {
            schema.insert("type".to_string(), json!([ty, "null"]));
        }
        Some(Value::Array(mut types)) if !types.iter().any(|t| *t == "null") => {
            types.push(Value::from("null"));
            schema.insert("type".to_string(), Value::Array(types));
        }
        _ => {}
    }

    if let Some(Value::Array(values)) = schema.get_mut("enum") {
        if !values.iter().any(Value::is_null) {
            values.push(Value::Null);
        }
    }

    if let Some(Value::Array(branches)) = schema.get_mut("anyOf") {
        if !branches.iter().any(|b| b.get("type") == Some(&Value::from("null"))) {
            branches.push(json!({ "type": "null" }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_scalar() {
        let converted = openapi_to_json_schema(&json!({
            "type": "string",
            "nullable": true
        }));
        assert_eq!(converted["type"], json!(["string", "null"]));
    }

    #[test]
    fn test_nullable_enum() {
        let converted = openapi_to_json_schema(&json!({
            "type": "string",
            "enum": ["Always", "Never"],
            "nullable": true
        }));
        assert_eq!(converted["enum"], json!(["Always", "Never", null]));
    }

    #[test]
    fn test_int_or_string() {
        let converted = openapi_to_json_schema(&json!({
            "x-kubernetes-int-or-string": true,
            "type": "string"
        }));
        assert!(converted.get("type").is_none());
        assert_eq!(
            converted["anyOf"],
            json!([{ "type": "integer" }, { "type": "string" }])
        );
    }

    #[test]
    fn test_nested_properties_and_items() {
        let converted = openapi_to_json_schema(&json!({
            "type": "object",
            "properties": {
                "spec": {
                    "type": "object",
                    "properties": {
                        "port": { "x-kubernetes-int-or-string": true },
                        "tags": {
                            "type": "array",
                            "items": { "type": "string", "nullable": true }
                        }
                    }
                }
            }
        }));

        let spec = &converted["properties"]["spec"]["properties"];
        assert!(spec["port"].get("anyOf").is_some());
        assert_eq!(spec["tags"]["items"]["type"], json!(["string", "null"]));
    }

    #[test]
    fn test_property_named_like_keyword_is_not_rewritten() {
        let converted = openapi_to_json_schema(&json!({
            "type": "object",
            "properties": {
                "nullable": { "type": "boolean" }
            }
        }));
        assert_eq!(converted["properties"]["nullable"]["type"], json!("boolean"));
        assert_eq!(converted["type"], json!("object"));
    }
}
