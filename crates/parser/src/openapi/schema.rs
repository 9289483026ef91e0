//! Local `$ref` resolution and shallow schema validation

use doc_extractor_common::ValidationResult;
use serde_json::Value;
use std::borrow::Cow;

/// Resolve a local reference such as `#/components/schemas/User`
///
/// Only same-document references are supported. Returns `None` when the
/// reference does not start with `#/` or any segment is missing. A resolved
/// node that itself contains a `$ref` is returned as-is.
pub fn get_schema<'a>(spec: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix("#/")?;

    pointer.split('/').try_fold(spec, |node, segment| {
        let segment = unescape_segment(segment);
        match node {
            Value::Object(map) => map.get(segment.as_ref()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Decode JSON-pointer escapes (`~1` is `/`, `~0` is `~`)
fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Check decoded request data against a schema, one level deep
///
/// Reports missing `required` fields and `properties` whose runtime kind
/// differs from the declared `type`. Nested objects, array items, formats,
/// enums and ranges are not checked. An absent schema is always valid.
pub fn validate_against_schema(data: &Value, schema: Option<&Value>) -> ValidationResult {
    let schema = match schema {
        Some(schema) if !schema.is_null() => schema,
        _ => return ValidationResult::from_errors(Vec::new()),
    };

    let mut errors = Vec::new();

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if data.get(field).is_none() {
                errors.push(format!("Missing required field: {}", field));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (field, property) in properties {
            let Some(value) = data.get(field) else {
                continue;
            };
            let Some(expected) = property.get("type").and_then(Value::as_str) else {
                continue;
            };

            if expected != value_kind(value) {
                errors.push(format!(
                    "Type mismatch for field {}: expected {}, got {}",
                    field,
                    expected,
                    value_kind(value)
                ));
            }
        }
    }

    ValidationResult::from_errors(errors)
}

/// Runtime kind of a JSON value, named after JSON Schema primitive types
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "components": {
                "schemas": {
                    "User": { "type": "object", "required": ["name"] },
                    "Alias": { "$ref": "#/components/schemas/User" }
                }
            },
            "paths": {
                "/users/{id}": { "get": { "tags": ["users", "admin"] } }
            }
        })
    }

    #[test]
    fn test_get_schema_resolves_local_ref() {
        let spec = spec();
        assert_eq!(
            get_schema(&spec, "#/components/schemas/User"),
            Some(&json!({ "type": "object", "required": ["name"] }))
        );
    }

    #[test]
    fn test_get_schema_missing_or_malformed() {
        let spec = spec();
        assert_eq!(get_schema(&spec, "#/components/schemas/Missing"), None);
        assert_eq!(get_schema(&spec, "components/schemas/User"), None);
        assert_eq!(get_schema(&spec, "other.yaml#/components/schemas/User"), None);
        assert_eq!(get_schema(&spec, "#/components/schemas/User/type/deeper"), None);
    }

    #[test]
    fn test_get_schema_does_not_follow_nested_refs() {
        let spec = spec();
        assert_eq!(
            get_schema(&spec, "#/components/schemas/Alias"),
            Some(&json!({ "$ref": "#/components/schemas/User" }))
        );
    }

    #[test]
    fn test_get_schema_pointer_escapes_and_indices() {
        let spec = spec();
        assert_eq!(
            get_schema(&spec, "#/paths/~1users~1{id}/get/tags/1"),
            Some(&json!("admin"))
        );
    }

    #[test]
    fn test_missing_required_field() {
        let result = validate_against_schema(
            &json!({ "name": "a" }),
            Some(&json!({ "required": ["name", "age"] })),
        );
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Missing required field: age"]);
    }

    #[test]
    fn test_type_mismatch() {
        let result = validate_against_schema(
            &json!({ "count": "5" }),
            Some(&json!({ "properties": { "count": { "type": "number" } } })),
        );
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["Type mismatch for field count: expected number, got string"]
        );
    }

    #[test]
    fn test_absent_schema_is_valid() {
        let result = validate_against_schema(&json!({ "anything": 1 }), None);
        assert!(result.valid);
        assert!(result.errors.is_empty());

        let result = validate_against_schema(&json!({}), Some(&Value::Null));
        assert!(result.valid);
    }

    #[test]
    fn test_shallow_only() {
        let schema = json!({
            "required": ["profile"],
            "properties": {
                "profile": {
                    "type": "object",
                    "required": ["email"],
                    "properties": { "age": { "type": "integer" } }
                },
                "tags": { "type": "array", "items": { "type": "integer" } },
                "ratio": { "type": "number" }
            }
        });
        let data = json!({
            "profile": { "age": "not checked" },
            "tags": ["a", "b"],
            "ratio": 7
        });

        let result = validate_against_schema(&data, Some(&schema));
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn test_integer_is_not_a_runtime_kind() {
        let schema = json!({ "properties": { "age": { "type": "integer" } } });

        for age in [json!(42), json!(4.5)] {
            let result = validate_against_schema(&json!({ "age": age }), Some(&schema));
            assert_eq!(
                result.errors,
                vec!["Type mismatch for field age: expected integer, got number"]
            );
        }
    }
}
