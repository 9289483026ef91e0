//! Structural validation of Swagger 2.0 / OpenAPI 3.x documents
//!
//! Checks the document skeleton (version marker, `info`, `paths`, operation
//! objects) and that every local `$ref` resolves. Schema contents are not
//! validated.

use super::schema::get_schema;
use doc_extractor_common::{ExtractorError, HttpMethod, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecVersion {
    Swagger2,
    OpenApi30,
    OpenApi31,
}

/// Validate a decoded document, reporting every problem found at once
pub fn validate_document(spec: &Value) -> Result<()> {
    let issues = collect_issues(spec);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ExtractorError::Validation(issues.join("; ")))
    }
}

fn collect_issues(spec: &Value) -> Vec<String> {
    let Some(root) = spec.as_object() else {
        return vec!["document root must be an object".to_string()];
    };

    let mut issues = Vec::new();
    let version = detect_version(root, &mut issues);
    check_info(root.get("info"), &mut issues);
    check_paths(root, version, &mut issues);
    check_references(spec, spec, &mut String::from("#"), &mut issues);

    issues
}

fn detect_version(root: &Map<String, Value>, issues: &mut Vec<String>) -> Option<SpecVersion> {
    match (root.get("swagger"), root.get("openapi")) {
        (Some(_), Some(_)) => {
            issues.push("document declares both `swagger` and `openapi`".to_string());
            None
        }
        (Some(swagger), None) => match swagger.as_str() {
            Some("2.0") => Some(SpecVersion::Swagger2),
            _ => {
                issues.push(format!("unsupported swagger version {}", swagger));
                None
            }
        },
        (None, Some(openapi)) => match openapi.as_str() {
            Some(v) if v.starts_with("3.0") => Some(SpecVersion::OpenApi30),
            Some(v) if v.starts_with("3.") => Some(SpecVersion::OpenApi31),
            _ => {
                issues.push(format!("unsupported openapi version {}", openapi));
                None
            }
        },
        (None, None) => {
            issues.push("missing `swagger` or `openapi` version field".to_string());
            None
        }
    }
}

fn check_info(info: Option<&Value>, issues: &mut Vec<String>) {
    let Some(info) = info.and_then(Value::as_object) else {
        issues.push("missing `info` object".to_string());
        return;
    };

    for field in ["title", "version"] {
        if !info.get(field).is_some_and(Value::is_string) {
            issues.push(format!("`info.{}` must be a string", field));
        }
    }
}

fn check_paths(root: &Map<String, Value>, version: Option<SpecVersion>, issues: &mut Vec<String>) {
    let paths = match root.get("paths") {
        Some(Value::Object(paths)) => paths,
        Some(_) => {
            issues.push("`paths` must be an object".to_string());
            return;
        }
        None => {
            // 3.1 documents may describe only webhooks or components
            let paths_optional = version == Some(SpecVersion::OpenApi31)
                && (root.contains_key("webhooks") || root.contains_key("components"));
            if !paths_optional {
                issues.push("missing `paths` object".to_string());
            }
            return;
        }
    };

    let responses_required = version != Some(SpecVersion::OpenApi31);

    for (path, item) in paths {
        if path.starts_with("x-") {
            continue;
        }
        if !path.starts_with('/') {
            issues.push(format!("path `{}` must begin with `/`", path));
        }
        let Some(item) = item.as_object() else {
            issues.push(format!("path item `{}` must be an object", path));
            continue;
        };

        for (key, operation) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            let Some(operation) = operation.as_object() else {
                issues.push(format!("operation {} {} must be an object", method, path));
                continue;
            };
            if responses_required && !operation.get("responses").is_some_and(Value::is_object) {
                issues.push(format!(
                    "operation {} {} is missing a `responses` object",
                    method, path
                ));
            }
        }
    }
}

/// Walk the whole document and report local references that do not resolve
fn check_references(spec: &Value, node: &Value, pointer: &mut String, issues: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                if reference.starts_with("#/") && get_schema(spec, reference).is_none() {
                    issues.push(format!("unresolved reference `{}` at {}", reference, pointer));
                }
            }

            for (key, child) in map {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                check_references(spec, child, pointer, issues);
                pointer.truncate(len);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                check_references(spec, child, pointer, issues);
                pointer.truncate(len);
            }
        }
        _ => {}
    }
}
