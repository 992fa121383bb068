//! Schema normalization
//!
//! Content types have historically been declared in two dialects:
//!
//! - a native schema tree (`{"type": "object", "properties": {...}}`), and
//! - a legacy field list (`{"fields": [{"name": "title", "type": "string", "required": true}]}`).
//!
//! Everything downstream (compatibility analysis, subset validation) works on
//! the native tree, so legacy definitions are converted here first.

use serde_json::{json, Map, Value};

/// Keys whose presence marks a tree as already native
const NATIVE_MARKERS: &[&str] = &["type", "properties", "oneOf", "anyOf", "allOf", "$schema"];

/// Scalar and container type names a legacy field may declare
const LEGACY_TYPES: &[&str] = &["string", "number", "integer", "boolean", "object", "array", "null"];

/// Top-level keys carried over from a legacy definition untouched
const CARRIED_KEYS: &[&str] = &["metadata", "ui", "title", "description", "$id"];

/// Whether a schema tree carries a native marker keyword
pub fn is_native(schema: &Value) -> bool {
    schema
        .as_object()
        .map(|obj| NATIVE_MARKERS.iter().any(|k| obj.contains_key(*k)))
        .unwrap_or(false)
}

/// Whether a schema tree is a legacy field list: a `fields` array and no
/// native marker
pub fn is_legacy(schema: &Value) -> bool {
    !is_native(schema) && schema.get("fields").map_or(false, Value::is_array)
}

/// Normalize a schema in either dialect into a native schema tree.
///
/// Only legacy field lists are converted. Everything else, including roots
/// built from `$ref`/`$defs`, `enum` or `const` alone, comes back as an
/// unchanged copy.
pub fn normalize(schema: &Value) -> Value {
    let obj = match schema.as_object() {
        Some(obj) if is_legacy(schema) => obj,
        _ => return schema.clone(),
    };

    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in obj.get("fields").and_then(Value::as_array).into_iter().flatten() {
        let Some(name) = field.get("name").and_then(Value::as_str) else {
            tracing::debug!(?field, "skipping legacy field without a name");
            continue;
        };
        properties.insert(name.to_string(), field_schema(field));
        if field.get("required") == Some(&Value::Bool(true)) {
            required.push(Value::String(name.to_string()));
        }
    }

    let additional = obj
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut out = Map::new();
    out.insert("type".to_string(), json!("object"));
    out.insert("properties".to_string(), Value::Object(properties));
    out.insert("additionalProperties".to_string(), Value::Bool(additional));
    if !required.is_empty() {
        out.insert("required".to_string(), Value::Array(required));
    }
    for (key, value) in obj {
        if CARRIED_KEYS.contains(&key.as_str()) || key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }

    Value::Object(out)
}

fn field_schema(field: &Value) -> Value {
    if let Some(schema) = field.get("schema").filter(|s| s.is_object()) {
        return schema.clone();
    }
    match field.get("type").and_then(Value::as_str) {
        Some(ty) if LEGACY_TYPES.contains(&ty) => json!({ "type": ty }),
        _ => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_passthrough() {
        let schema = json!({
            "type": "object",
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        });
        assert!(is_native(&schema));
        assert_eq!(normalize(&schema), schema);
    }

    #[test]
    fn test_oneof_only_is_native() {
        let schema = json!({ "oneOf": [{ "type": "string" }, { "type": "number" }] });
        assert_eq!(normalize(&schema), schema);
    }

    #[test]
    fn test_legacy_field_list() {
        let legacy = json!({
            "fields": [
                { "name": "title", "type": "string", "required": true },
                { "name": "views", "type": "integer" },
                { "name": "body", "schema": { "type": "string", "format": "markdown" } },
                { "name": "extra", "type": "widget" },
                { "name": "flag", "type": "boolean", "required": "yes" }
            ]
        });

        let normalized = normalize(&legacy);
        assert_eq!(
            normalized,
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "title": { "type": "string" },
                    "views": { "type": "integer" },
                    "body": { "type": "string", "format": "markdown" },
                    "extra": {},
                    "flag": { "type": "boolean" }
                },
                "required": ["title"]
            })
        );
    }

    #[test]
    fn test_legacy_additional_properties_override() {
        let legacy = json!({ "fields": [], "additionalProperties": true });
        assert_eq!(normalize(&legacy)["additionalProperties"], json!(true));
    }

    #[test]
    fn test_legacy_keeps_metadata() {
        let legacy = json!({
            "fields": [{ "name": "title", "type": "string" }],
            "metadata": { "slug": "article", "schema_version": "article@v1.0.0" },
            "x-editor": "rich"
        });
        let normalized = normalize(&legacy);
        assert_eq!(normalized["metadata"]["slug"], json!("article"));
        assert_eq!(normalized["x-editor"], json!("rich"));
    }

    #[test]
    fn test_empty_field_list_becomes_empty_object_schema() {
        let normalized = normalize(&json!({ "fields": [] }));
        assert_eq!(
            normalized,
            json!({ "type": "object", "properties": {}, "additionalProperties": false })
        );
    }

    #[test]
    fn test_only_field_lists_are_converted() {
        let inputs = [
            json!({}),
            json!({ "$defs": { "a": { "type": "string" } }, "$ref": "#/$defs/a" }),
            json!({ "enum": ["draft", "published"] }),
            json!({ "const": "article" }),
            json!({ "metadata": { "slug": "page" } }),
            json!({ "fields": "title" }),
        ];
        for input in inputs {
            assert!(!is_legacy(&input));
            assert_eq!(normalize(&input), input);
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            json!({ "fields": [{ "name": "a", "type": "string", "required": true }] }),
            json!({ "type": "object", "properties": { "a": { "type": "number" } } }),
            json!({}),
            json!({ "metadata": { "slug": "page" } }),
        ];
        for input in inputs {
            let once = normalize(&input);
            assert_eq!(normalize(&once), once);
        }
    }
}
