//! OpenAPI spec loader and document extractor

use super::converter::extract_endpoints;
use super::validator::validate_document;
use crate::fetch::Fetcher;
use crate::locator::{has_extension, is_remote, title_from_locator};
use doc_extractor_common::{DocumentType, Endpoint, ExtractorError, ParsedDocument, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

const SPEC_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// OpenAPI / Swagger extractor
///
/// Holds no per-call state; a single instance can serve concurrent parses.
#[derive(Clone)]
pub struct OpenApiExtractor {
    fetcher: Arc<dyn Fetcher>,
}

impl OpenApiExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Claims `.json`/`.yaml`/`.yml` locators and anything mentioning swagger or openapi
    pub fn can_handle(&self, locator: &str) -> bool {
        let lower = locator.to_ascii_lowercase();
        has_extension(locator, SPEC_EXTENSIONS)
            || lower.contains("swagger")
            || lower.contains("openapi")
    }

    /// Load and structurally validate a specification
    ///
    /// Local paths are read from disk; http(s) locators are fetched. JSON is
    /// tried first, then YAML. Any failure is logged and returned unchanged.
    pub async fn parse_source(&self, locator: &str) -> Result<Value> {
        let text = self
            .load_text(locator)
            .await
            .inspect_err(|e| error!(locator, error = %e, "Failed to load API specification"))?;

        let spec = decode_document(&text)
            .inspect_err(|e| error!(locator, error = %e, "Failed to decode API specification"))?;

        validate_document(&spec)
            .inspect_err(|e| error!(locator, error = %e, "API specification failed validation"))?;

        debug!(locator, "Loaded API specification");
        Ok(spec)
    }

    /// Load a specification and flatten it into a [`ParsedDocument`]
    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let spec = self.parse_source(locator).await?;
        let endpoints = extract_endpoints(&spec);
        let api_info = spec.get("info");

        let title = api_info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .unwrap_or_else(|| title_from_locator(locator));
        let content = api_info
            .and_then(|i| i.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        let spec_version = spec
            .get("openapi")
            .or_else(|| spec.get("swagger"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let api_version = api_info
            .and_then(|i| i.get("version"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        info!(
            locator,
            title = %title,
            endpoints = endpoints.len(),
            "Parsed API specification"
        );

        let mut document = ParsedDocument::new(DocumentType::Swagger, locator, title, content)
            .with_metadata("specVersion", spec_version)
            .with_metadata("apiVersion", api_version)
            .with_metadata("endpointCount", endpoints.len())
            .with_metadata("servers", server_urls(&spec))
            .with_metadata("tags", tag_names(&spec, &endpoints));
        document.endpoints = Some(endpoints);

        Ok(document)
    }

    async fn load_text(&self, locator: &str) -> Result<String> {
        if is_remote(locator) {
            self.fetcher.fetch_text(locator).await
        } else {
            Ok(tokio::fs::read_to_string(locator).await?)
        }
    }
}

/// Decode JSON, falling back to YAML
fn decode_document(text: &str) -> Result<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_error) => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|yaml_error| {
                ExtractorError::Parse(format!(
                    "Document is neither JSON ({}) nor YAML ({})",
                    json_error, yaml_error
                ))
            })?;
            Ok(yaml_to_json(yaml))
        }
    }
}

/// Convert a YAML tree, stringifying non-string mapping keys such as `200:`
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => serde_yaml::to_string(&other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                };
                object.insert(key, yaml_to_json(value));
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// OpenAPI 3 `servers[].url`, or the Swagger 2.0 `schemes`/`host`/`basePath` triple
fn server_urls(spec: &Value) -> Vec<String> {
    if let Some(servers) = spec.get("servers").and_then(Value::as_array) {
        return servers
            .iter()
            .filter_map(|s| s.get("url").and_then(Value::as_str))
            .map(String::from)
            .collect();
    }

    let Some(host) = spec.get("host").and_then(Value::as_str) else {
        return Vec::new();
    };
    let base_path = spec.get("basePath").and_then(Value::as_str).unwrap_or("");
    let schemes: Vec<&str> = spec
        .get("schemes")
        .and_then(Value::as_array)
        .map(|s| s.iter().filter_map(Value::as_str).collect())
        .filter(|s: &Vec<&str>| !s.is_empty())
        .unwrap_or_else(|| vec!["https"]);

    schemes
        .into_iter()
        .map(|scheme| format!("{}://{}{}", scheme, host, base_path))
        .collect()
}

/// Declared root tags, else the tags used by endpoints, first occurrence order
fn tag_names(spec: &Value, endpoints: &[Endpoint]) -> Vec<String> {
    let declared: Vec<String> = spec
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    if !declared.is_empty() {
        return declared;
    }

    let mut used: Vec<String> = Vec::new();
    for tag in endpoints.iter().flat_map(|e| e.tags.iter()) {
        if !used.contains(tag) {
            used.push(tag.clone());
        }
    }
    used
}
