//! Expansion of board schema shorthand into JSON Schema.
//!
//! Boards usually carry a compact notation:
//!
//! ```text
//! { "orderId": "string|format:uuid", "items": "string[]", "note?": "string" }
//! ```
//!
//! Keys ending in `?` are optional, `type[]` denotes an array, `|key:value`
//! pairs add keywords, nested objects are expanded recursively. Values that
//! already look like JSON Schema (a `type` or `$ref` key) pass through.

use serde_json::{json, Map, Value};

const PRIMITIVES: &[&str] = &["string", "integer", "number", "boolean", "null"];
const NUMERIC_KEYWORDS: &[&str] = &[
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
    "multipleOf",
];

/// Expand a schema value, returning a human-readable message on malformed input.
pub fn expand_schema(value: &Value) -> Result<Value, String> {
    match value {
        Value::Object(map) if is_full_schema(map) => Ok(value.clone()),
        Value::Object(map) => expand_object(map),
        other => Err(format!("expected an object schema, got {}", other)),
    }
}

fn is_full_schema(map: &Map<String, Value>) -> bool {
    map.get("type").map(Value::is_string).unwrap_or(false) || map.contains_key("$ref")
}

fn expand_object(map: &Map<String, Value>) -> Result<Value, String> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (raw_key, raw_value) in map {
        let (key, optional) = match raw_key.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (raw_key.as_str(), false),
        };
        if key.is_empty() {
            return Err(format!("invalid property name {:?}", raw_key));
        }

        let property = match raw_value {
            Value::String(shorthand) => expand_shorthand(shorthand)
                .map_err(|e| format!("property {}: {}", key, e))?,
            Value::Object(nested) if is_full_schema(nested) => raw_value.clone(),
            Value::Object(nested) => expand_object(nested)?,
            other => return Err(format!("property {}: unsupported value {}", key, other)),
        };

        if !optional {
            required.push(Value::String(key.to_string()));
        }
        properties.insert(key.to_string(), property);
    }

    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    }))
}

fn expand_shorthand(shorthand: &str) -> Result<Value, String> {
    let mut parts = shorthand.split('|').map(str::trim);
    let type_part = parts.next().unwrap_or_default();
    if type_part.is_empty() {
        return Err("missing type".to_string());
    }

    let (type_name, is_array) = match type_part.strip_suffix("[]") {
        Some(inner) => (inner, true),
        None => (type_part, false),
    };

    let mut schema = if PRIMITIVES.contains(&type_name) {
        let mut m = Map::new();
        m.insert("type".to_string(), Value::String(type_name.to_string()));
        m
    } else {
        let mut m = Map::new();
        m.insert(
            "$ref".to_string(),
            Value::String(format!("#/definitions/{}", type_name)),
        );
        m
    };

    for modifier in parts.filter(|p| !p.is_empty()) {
        let (key, value) = modifier
            .split_once(':')
            .ok_or_else(|| format!("modifier {:?} must look like key:value", modifier))?;
        schema.insert(key.to_string(), modifier_value(key, value)?);
    }

    if is_array {
        Ok(json!({ "type": "array", "items": Value::Object(schema) }))
    } else {
        Ok(Value::Object(schema))
    }
}

fn modifier_value(key: &str, value: &str) -> Result<Value, String> {
    if NUMERIC_KEYWORDS.contains(&key) {
        let number: f64 = value
            .parse()
            .map_err(|_| format!("{} expects a number, got {:?}", key, value))?;
        if !number.is_finite() {
            return Err(format!("{} expects a finite number, got {:?}", key, value));
        }
        return Ok(if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
            json!(number as i64)
        } else {
            json!(number)
        });
    }
    if key == "enum" {
        return Ok(Value::Array(
            value
                .split(',')
                .map(|v| Value::String(v.trim().to_string()))
                .collect(),
        ));
    }
    Ok(Value::String(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_shorthand_object() {
        let schema = expand_schema(&json!({
            "orderId": "string|format:uuid",
            "quantity": "integer|minimum:1",
            "note?": "string|maxLength:200",
            "tags": "string[]",
            "address": {"street": "string"},
            "status": "string|enum:open, closed",
            "customer": "CustomerId"
        }))
        .unwrap();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["properties"]["orderId"],
            json!({"type": "string", "format": "uuid"})
        );
        assert_eq!(schema["properties"]["quantity"]["minimum"], json!(1));
        assert_eq!(
            schema["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            schema["properties"]["address"]["required"],
            json!(["street"])
        );
        assert_eq!(
            schema["properties"]["status"]["enum"],
            json!(["open", "closed"])
        );
        assert_eq!(
            schema["properties"]["customer"],
            json!({"$ref": "#/definitions/CustomerId"})
        );

        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("orderId")));
        assert!(!required.contains(&json!("note")));
        assert!(schema["properties"].get("note").is_some());
    }

    #[test]
    fn test_full_schema_passes_through() {
        let full = json!({"type": "object", "properties": {}});
        assert_eq!(expand_schema(&full).unwrap(), full);
    }

    #[test]
    fn test_malformed_shorthand_is_rejected() {
        assert!(expand_schema(&json!({"a": ""})).is_err());
        assert!(expand_schema(&json!({"a": "string|format"})).is_err());
        assert!(expand_schema(&json!({"a": "integer|minimum:lots"})).is_err());
        assert!(expand_schema(&json!({"a": 3})).is_err());
        assert!(expand_schema(&json!({"?": "string"})).is_err());
        assert!(expand_schema(&json!("string")).is_err());
    }

    #[test]
    fn test_numeric_modifiers_must_be_finite() {
        assert!(expand_schema(&json!({"a": "number|minimum:NaN"})).is_err());
        assert!(expand_schema(&json!({"a": "integer|maximum:inf"})).is_err());
        assert!(expand_schema(&json!({"a": "integer|maximum:-infinity"})).is_err());

        let schema = expand_schema(&json!({
            "big": "integer|maximum:1e20",
            "small": "number|minimum:0.5",
            "whole": "integer|minimum:-3"
        }))
        .unwrap();
        assert_eq!(schema["properties"]["big"]["maximum"], json!(1e20));
        assert_eq!(schema["properties"]["small"]["minimum"], json!(0.5));
        assert_eq!(schema["properties"]["whole"]["minimum"], json!(-3));
    }
}
