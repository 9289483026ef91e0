//! Normalized document model shared by all extractors

use crate::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Format-specific facts about a parsed document, keyed by camelCase name
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Source format of a parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Swagger,
    Pdf,
    Excel,
    Word,
    Text,
    Confluence,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Swagger => "swagger",
            DocumentType::Pdf => "pdf",
            DocumentType::Excel => "excel",
            DocumentType::Word => "word",
            DocumentType::Text => "text",
            DocumentType::Confluence => "confluence",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metadata value
///
/// Metadata is intentionally limited to a closed set of kinds. Keys populated
/// per format:
/// - swagger: `source`, `specVersion`, `apiVersion`, `endpointCount`, `servers`, `tags`
/// - pdf: `source`, `pageCount`
/// - excel: `source`, `sheetNames`, `sheetCount`
/// - word: `source`, `paragraphCount`
/// - text: `source`, `extension`, `lineCount`
/// - confluence: `source`, `pageId`, `spaceKey`, `version`, `apiUrl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetadataValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Number(value as f64)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        MetadataValue::List(value)
    }
}

/// The common output of every extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Display name of the source document
    pub title: String,

    /// Plain-text representation (empty for purely structural sources)
    pub content: String,

    /// Endpoints, present only for API specifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<Endpoint>>,

    /// Format-specific facts; always contains `source`
    pub metadata: Metadata,

    /// Source format
    #[serde(rename = "type")]
    pub document_type: DocumentType,
}

impl ParsedDocument {
    /// Create a document whose metadata records the originating locator
    pub fn new(
        document_type: DocumentType,
        source: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), MetadataValue::from(source));

        Self {
            title: title.into(),
            content: content.into(),
            endpoints: None,
            metadata,
            document_type,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// The locator this document was parsed from
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(MetadataValue::as_str)
    }
}
