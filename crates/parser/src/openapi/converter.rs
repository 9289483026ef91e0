//! Flattens an OpenAPI / Swagger document into normalized endpoints

use super::schema::get_schema;
use doc_extractor_common::{
    Endpoint, HttpMethod, Parameter, ParameterLocation, RequestBody, Response,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Extract every (path, method) operation of a validated document
///
/// Paths and methods are visited in document order. Keys under a path item
/// that are not HTTP methods (`parameters`, `$ref`, `summary`, extensions)
/// are skipped. Paths are prefixed with the Swagger 2.0 `basePath`, if any.
/// No sorting or de-duplication is performed.
pub fn extract_endpoints(spec: &Value) -> Vec<Endpoint> {
    let base_path = spec.get("basePath").and_then(Value::as_str).unwrap_or("");
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut endpoints = Vec::new();

    for (path, path_item) in paths {
        let Some(path_item) = path_item.as_object() else {
            continue;
        };
        let shared_parameters = path_item.get("parameters");

        for (key, operation) in path_item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            let Some(operation) = operation.as_object() else {
                continue;
            };

            endpoints.push(build_endpoint(
                spec,
                format!("{}{}", base_path, path),
                method,
                shared_parameters,
                operation,
            ));
        }
    }

    endpoints
}

fn build_endpoint(
    spec: &Value,
    path: String,
    method: HttpMethod,
    shared_parameters: Option<&Value>,
    operation: &Map<String, Value>,
) -> Endpoint {
    let raw_parameters = merge_parameters(spec, shared_parameters, operation.get("parameters"));

    let request_body = match operation.get("requestBody") {
        Some(body) => extract_request_body(spec, body),
        None => legacy_request_body(spec, operation, &raw_parameters),
    };

    let mut endpoint = Endpoint::new(path, method);
    endpoint.summary = string_field(operation, "summary");
    endpoint.description = string_field(operation, "description");
    endpoint.parameters = raw_parameters
        .iter()
        .filter_map(|raw| extract_parameter(raw))
        .collect();
    endpoint.request_body = request_body;
    endpoint.responses = extract_responses(spec, operation);
    endpoint.tags = operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    endpoint.operation_id = string_field(operation, "operationId");
    endpoint.deprecated = operation
        .get("deprecated")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    endpoint
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(String::from)
}

/// Follow a single `$ref` hop, if the node is a reference
fn resolve<'a>(spec: &'a Value, node: &'a Value) -> Option<&'a Value> {
    match node.get("$ref").and_then(Value::as_str) {
        Some(reference) => get_schema(spec, reference),
        None => Some(node),
    }
}

/// Path-item parameters followed by operation parameters
///
/// An operation parameter with the same name and location replaces the
/// path-level one in place. Unresolvable references are dropped.
fn merge_parameters<'a>(
    spec: &'a Value,
    shared: Option<&'a Value>,
    own: Option<&'a Value>,
) -> Vec<&'a Value> {
    let mut merged: Vec<&Value> = Vec::new();

    let sources = [shared, own];
    for list in sources.into_iter().flatten().filter_map(Value::as_array) {
        for raw in list {
            let Some(parameter) = resolve(spec, raw) else {
                continue;
            };

            let key = parameter_key(parameter);
            match merged.iter().position(|existing| parameter_key(existing) == key) {
                Some(index) if key.is_some() => merged[index] = parameter,
                _ => merged.push(parameter),
            }
        }
    }

    merged
}

fn location(parameter: &Value) -> Option<&str> {
    parameter.get("in").and_then(Value::as_str)
}

fn parameter_key(parameter: &Value) -> Option<(&str, &str)> {
    Some((
        parameter.get("name")?.as_str()?,
        location(parameter)?,
    ))
}

/// Convert a raw parameter; `body` and `formData` parameters yield `None`
fn extract_parameter(raw: &Value) -> Option<Parameter> {
    let name = raw.get("name")?.as_str()?;
    let location = ParameterLocation::parse(raw.get("in")?.as_str()?)?;

    Some(Parameter {
        name: name.to_string(),
        location,
        description: raw
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
        schema: parameter_schema(raw),
        example: raw.get("example").cloned(),
    })
}

/// The parameter's schema object, or `{ "type": ... }` for legacy declarations
fn parameter_schema(raw: &Value) -> Value {
    match raw.get("schema") {
        Some(schema) if schema.is_object() => schema.clone(),
        _ => {
            let mut legacy = Map::new();
            if let Some(kind) = raw.get("type") {
                legacy.insert("type".to_string(), kind.clone());
            }
            Value::Object(legacy)
        }
    }
}

/// OpenAPI 3 `requestBody`
fn extract_request_body(spec: &Value, raw: &Value) -> Option<RequestBody> {
    let body = resolve(spec, raw)?;

    let content = body
        .get("content")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .map(|(media_type, media)| (media_type.clone(), media_schema(media)))
                .collect()
        })
        .unwrap_or_default();

    Some(RequestBody {
        required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
        description: body
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        content,
    })
}

fn media_schema(media: &Value) -> Value {
    media.get("schema").cloned().unwrap_or_else(|| json!({}))
}

/// Swagger 2.0 `body` / `formData` parameters expressed as a request body
fn legacy_request_body(
    spec: &Value,
    operation: &Map<String, Value>,
    parameters: &[&Value],
) -> Option<RequestBody> {
    if let Some(body) = parameters.iter().find(|p| location(p) == Some("body")) {
        let schema = body.get("schema").cloned().unwrap_or_else(|| json!({}));
        let content = media_types(spec, operation, "consumes", DEFAULT_MEDIA_TYPE)
            .into_iter()
            .map(|media_type| (media_type, schema.clone()))
            .collect();

        return Some(RequestBody {
            required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
            description: body
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            content,
        });
    }

    let form_fields: Vec<&&Value> = parameters
        .iter()
        .filter(|p| location(p) == Some("formData"))
        .collect();
    if form_fields.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &form_fields {
        let Some(name) = field.get("name").and_then(Value::as_str) else {
            continue;
        };
        properties.insert(name.to_string(), parameter_schema(field));
        if field.get("required").and_then(Value::as_bool).unwrap_or(false) {
            required.push(Value::String(name.to_string()));
        }
    }

    let schema = json!({
        "type": "object",
        "properties": properties,
        "required": required,
    });
    let content = media_types(spec, operation, "consumes", FORM_MEDIA_TYPE)
        .into_iter()
        .map(|media_type| (media_type, schema.clone()))
        .collect();

    Some(RequestBody {
        required: !required.is_empty(),
        description: None,
        content,
    })
}

/// Operation-level `consumes`/`produces`, else the root list, else `fallback`
fn media_types(
    spec: &Value,
    operation: &Map<String, Value>,
    key: &str,
    fallback: &str,
) -> Vec<String> {
    let declared = |node: Option<&Value>| -> Option<Vec<String>> {
        let list: Vec<String> = node?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect();
        (!list.is_empty()).then_some(list)
    };

    declared(operation.get(key))
        .or_else(|| declared(spec.get(key)))
        .unwrap_or_else(|| vec![fallback.to_string()])
}

fn extract_responses(spec: &Value, operation: &Map<String, Value>) -> BTreeMap<String, Response> {
    let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
        return Default::default();
    };

    responses
        .iter()
        .filter_map(|(status, raw)| {
            let response = resolve(spec, raw)?;
            Some((status.clone(), extract_response(spec, operation, response)))
        })
        .collect()
}

fn extract_response(spec: &Value, operation: &Map<String, Value>, raw: &Value) -> Response {
    let content = match raw.get("content").and_then(Value::as_object) {
        Some(entries) => Some(
            entries
                .iter()
                .map(|(media_type, media)| (media_type.clone(), media_schema(media)))
                .collect(),
        ),
        // Swagger 2.0 puts the schema directly on the response
        None => raw.get("schema").map(|schema| {
            media_types(spec, operation, "produces", DEFAULT_MEDIA_TYPE)
                .into_iter()
                .map(|media_type| (media_type, schema.clone()))
                .collect()
        }),
    };

    Response {
        description: raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        content,
        headers: raw.get("headers").and_then(Value::as_object).cloned(),
    }
}
