//! Parser selection
//!
//! Extractors are probed in a fixed registration order and the first one
//! whose capability predicate accepts the locator wins. Predicates overlap
//! (a `.json` file is both an API spec candidate and plain text), so the
//! order is the tie-break:
//!
//! 1. Swagger / OpenAPI
//! 2. PDF
//! 3. Excel / CSV
//! 4. Word
//! 5. Confluence
//! 6. Text (catch-all)

use crate::confluence::ConfluenceExtractor;
use crate::excel::ExcelExtractor;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::openapi::OpenApiExtractor;
use crate::pdf::PdfExtractor;
use crate::text::TextExtractor;
use crate::word::WordExtractor;
use doc_extractor_common::{DocumentType, ExtractorConfig, ExtractorError, ParsedDocument, Result};
use std::sync::Arc;
use tracing::debug;

/// Human-readable descriptions of the supported formats, in registration order
pub const SUPPORTED_FORMATS: &[&str] = &[
    "Swagger/OpenAPI (.json, .yaml, .yml, or any locator containing \"swagger\"/\"openapi\")",
    "PDF (.pdf)",
    "Excel/CSV (.xlsx, .xlsm, .xlsb, .xls, .ods, .csv)",
    "Word (.docx)",
    "Confluence (URLs containing \"confluence\" or \"atlassian\"; requires CONFLUENCE_TOKEN)",
    "Text (.txt, .md, .markdown, .rst, .json, .yaml, .yml, .xml, .html, .htm, .log, .ini, .toml)",
];

/// One registered extractor
#[derive(Clone)]
pub enum Extractor {
    Swagger(OpenApiExtractor),
    Pdf(PdfExtractor),
    Excel(ExcelExtractor),
    Word(WordExtractor),
    Confluence(ConfluenceExtractor),
    Text(TextExtractor),
}

impl Extractor {
    pub fn document_type(&self) -> DocumentType {
        match self {
            Extractor::Swagger(_) => DocumentType::Swagger,
            Extractor::Pdf(_) => DocumentType::Pdf,
            Extractor::Excel(_) => DocumentType::Excel,
            Extractor::Word(_) => DocumentType::Word,
            Extractor::Confluence(_) => DocumentType::Confluence,
            Extractor::Text(_) => DocumentType::Text,
        }
    }

    pub fn can_handle(&self, locator: &str) -> bool {
        match self {
            Extractor::Swagger(e) => e.can_handle(locator),
            Extractor::Pdf(e) => e.can_handle(locator),
            Extractor::Excel(e) => e.can_handle(locator),
            Extractor::Word(e) => e.can_handle(locator),
            Extractor::Confluence(e) => e.can_handle(locator),
            Extractor::Text(e) => e.can_handle(locator),
        }
    }

    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        match self {
            Extractor::Swagger(e) => e.parse(locator).await,
            Extractor::Pdf(e) => e.parse(locator).await,
            Extractor::Excel(e) => e.parse(locator).await,
            Extractor::Word(e) => e.parse(locator).await,
            Extractor::Confluence(e) => e.parse(locator).await,
            Extractor::Text(e) => e.parse(locator).await,
        }
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Extractor({})", self.document_type())
    }
}

/// Ordered set of extractors
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    extractors: Vec<Extractor>,
}

impl ParserRegistry {
    /// Registry backed by a reqwest HTTP client
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Registry using the given fetcher for every remote locator
    pub fn with_fetcher(config: &ExtractorConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let extractors = vec![
            Extractor::Swagger(OpenApiExtractor::new(Arc::clone(&fetcher))),
            Extractor::Pdf(PdfExtractor::new()),
            Extractor::Excel(ExcelExtractor::new()),
            Extractor::Word(WordExtractor::new()),
            Extractor::Confluence(ConfluenceExtractor::new(config, fetcher)),
            Extractor::Text(TextExtractor::new()),
        ];

        Self { extractors }
    }

    /// Registered extractors in probe order
    pub fn extractors(&self) -> &[Extractor] {
        &self.extractors
    }

    /// First extractor accepting the locator
    pub fn select(&self, locator: &str) -> Option<&Extractor> {
        let selected = self.extractors.iter().find(|e| e.can_handle(locator));
        debug!(
            locator,
            selected = selected.map(|e| e.document_type().as_str()),
            "Selected extractor"
        );
        selected
    }

    pub fn supported_formats(&self) -> &'static [&'static str] {
        SUPPORTED_FORMATS
    }

    /// Select an extractor and parse the locator with it
    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let extractor = self
            .select(locator)
            .ok_or_else(|| ExtractorError::UnsupportedLocator(locator.to_string()))?;
        extractor.parse(locator).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;

    fn registry() -> ParserRegistry {
        ParserRegistry::with_fetcher(&ExtractorConfig::default(), Arc::new(MockFetcher::new()))
    }

    fn selected(locator: &str) -> Option<DocumentType> {
        registry().select(locator).map(Extractor::document_type)
    }

    #[test]
    fn test_registration_order() {
        let order: Vec<DocumentType> = registry()
            .extractors()
            .iter()
            .map(Extractor::document_type)
            .collect();

        assert_eq!(
            order,
            vec![
                DocumentType::Swagger,
                DocumentType::Pdf,
                DocumentType::Excel,
                DocumentType::Word,
                DocumentType::Confluence,
                DocumentType::Text,
            ]
        );
    }

    #[test]
    fn test_json_prefers_swagger_over_text() {
        assert!(TextExtractor::new().can_handle("data/petstore.json"));
        assert_eq!(selected("data/petstore.json"), Some(DocumentType::Swagger));
    }

    #[test]
    fn test_earlier_registration_wins() {
        // matches both the swagger substring and the PDF extension
        assert_eq!(selected("docs/swagger-guide.pdf"), Some(DocumentType::Swagger));
        assert_eq!(
            selected("https://acme.atlassian.net/wiki/x/report.pdf"),
            Some(DocumentType::Pdf)
        );
    }

    #[test]
    fn test_supported_formats_follow_registration_order() {
        let registry = registry();
        assert_eq!(registry.supported_formats().len(), registry.extractors().len());
        assert!(registry.supported_formats()[0].starts_with("Swagger"));
        assert!(registry.supported_formats()[5].starts_with("Text"));
    }

    #[tokio::test]
    async fn test_parse_unsupported_locator() {
        let result = registry().parse("archive.tar.gz").await;
        assert!(matches!(result, Err(ExtractorError::UnsupportedLocator(_))));
    }
}
