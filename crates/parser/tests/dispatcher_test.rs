//! Integration tests for parser selection and end-to-end parsing

use async_trait::async_trait;
use doc_extractor_common::{DocumentType, ExtractorConfig, ExtractorError, HttpMethod, Result};
use doc_extractor_parser::{Fetcher, ParserRegistry};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fetcher that counts calls and serves one canned Confluence page
#[derive(Default)]
struct RecordingFetcher {
    calls: AtomicUsize,
    last_token: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ExtractorError::Http(format!("offline: {}", url)))
    }

    async fn fetch_json_with_bearer(&self, _url: &str, token: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.to_string());
        Ok(json!({
            "id": "77",
            "body": { "storage": { "value": "<p>Hello <b>team</b></p>" } }
        }))
    }
}

fn registry_with(config: &ExtractorConfig) -> (ParserRegistry, Arc<RecordingFetcher>) {
    let fetcher = Arc::new(RecordingFetcher::default());
    let registry = ParserRegistry::with_fetcher(config, fetcher.clone());
    (registry, fetcher)
}

fn temp_file(prefix: &str, suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_selection_by_locator() {
    let (registry, _) = registry_with(&ExtractorConfig::default());
    let selected = |locator: &str| registry.select(locator).map(|e| e.document_type());

    assert_eq!(selected("specs/petstore.json"), Some(DocumentType::Swagger));
    assert_eq!(selected("https://api.example.com/openapi"), Some(DocumentType::Swagger));
    assert_eq!(selected("reports/q3.pdf"), Some(DocumentType::Pdf));
    assert_eq!(selected("reports/q3.xlsx"), Some(DocumentType::Excel));
    assert_eq!(selected("reports/q3.csv"), Some(DocumentType::Excel));
    assert_eq!(selected("docs/handbook.docx"), Some(DocumentType::Word));
    assert_eq!(
        selected("https://acme.atlassian.net/wiki/spaces/ENG/pages/1/Home"),
        Some(DocumentType::Confluence)
    );
    assert_eq!(selected("notes/todo.txt"), Some(DocumentType::Text));
    assert_eq!(selected("bin/tool.exe"), None);
    assert_eq!(selected("Makefile"), None);
}

#[tokio::test]
async fn test_parse_openapi_file() {
    let file = temp_file(
        "inventory",
        ".json",
        r#"{
            "openapi": "3.0.0",
            "info": { "title": "Inventory", "version": "2.1", "description": "Stock levels" },
            "servers": [{ "url": "https://inventory.example.com" }],
            "paths": {
                "/items": {
                    "get": { "tags": ["items"], "responses": { "200": { "description": "OK" } } },
                    "post": { "tags": ["items"], "responses": { "201": { "description": "Created" } } }
                }
            }
        }"#,
    );
    let locator = file.path().to_str().unwrap();
    let (registry, fetcher) = registry_with(&ExtractorConfig::default());

    let document = registry.parse(locator).await.unwrap();

    assert_eq!(document.document_type, DocumentType::Swagger);
    assert_eq!(document.title, "Inventory");
    assert_eq!(document.content, "Stock levels");
    assert_eq!(document.source(), Some(locator));
    assert_eq!(document.metadata["specVersion"].as_str(), Some("3.0.0"));
    assert_eq!(document.metadata["apiVersion"].as_str(), Some("2.1"));
    assert_eq!(document.metadata["endpointCount"].as_number(), Some(2.0));
    assert_eq!(
        document.metadata["servers"].as_list(),
        Some(&["https://inventory.example.com".to_string()][..])
    );

    let endpoints = document.endpoints.unwrap();
    assert_eq!(endpoints[0].method, HttpMethod::Get);
    assert_eq!(endpoints[1].method, HttpMethod::Post);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_parse_invalid_openapi_file() {
    let file = temp_file("broken-openapi", ".yaml", "openapi: 3.0.0\npaths: {}\n");
    let (registry, _) = registry_with(&ExtractorConfig::default());

    let result = registry.parse(file.path().to_str().unwrap()).await;

    assert!(matches!(result, Err(ExtractorError::Validation(_))));
}

#[tokio::test]
async fn test_parse_text_and_csv() {
    let (registry, _) = registry_with(&ExtractorConfig::default());

    let text = temp_file("changelog", ".txt", "v1.0\n- first release\n");
    let document = registry.parse(text.path().to_str().unwrap()).await.unwrap();
    assert_eq!(document.document_type, DocumentType::Text);
    assert_eq!(document.content, "v1.0\n- first release\n");
    assert!(document.endpoints.is_none());

    let csv = temp_file("prices", ".csv", "item,price\ntea,3\n");
    let document = registry.parse(csv.path().to_str().unwrap()).await.unwrap();
    assert_eq!(document.document_type, DocumentType::Excel);
    assert!(document.content.starts_with("Sheet: prices"));
    assert!(document.content.ends_with("item,price\ntea,3"));
}

#[tokio::test]
async fn test_confluence_without_token_never_fetches() {
    let (registry, fetcher) = registry_with(&ExtractorConfig::default());

    let result = registry
        .parse("https://acme.atlassian.net/wiki/spaces/ENG/pages/77/Welcome")
        .await;

    assert!(matches!(result, Err(ExtractorError::Config(_))));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_confluence_with_token_fetches_once() {
    let config = ExtractorConfig::default().with_confluence_token("abc123");
    let (registry, fetcher) = registry_with(&config);

    let document = registry
        .parse("https://acme.atlassian.net/wiki/spaces/ENG/pages/77/Welcome")
        .await
        .unwrap();

    assert_eq!(document.document_type, DocumentType::Confluence);
    assert_eq!(document.title, "Confluence Page");
    assert_eq!(document.content, "Hello team");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.last_token.lock().unwrap().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_unsupported_locator() {
    let (registry, _) = registry_with(&ExtractorConfig::default());
    let result = registry.parse("bin/tool.exe").await;

    match result {
        Err(ExtractorError::UnsupportedLocator(locator)) => assert_eq!(locator, "bin/tool.exe"),
        other => panic!("expected unsupported locator, got {:?}", other),
    }
}
