//! Plain-text extractor, the catch-all for textual formats

use crate::locator::{extension, has_extension, title_from_locator};
use doc_extractor_common::{DocumentType, ExtractorError, ParsedDocument, Result};
use tracing::{error, info};

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "json", "yaml", "yml", "xml", "html", "htm", "log", "ini",
    "toml",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn can_handle(&self, locator: &str) -> bool {
        has_extension(locator, TEXT_EXTENSIONS)
    }

    /// Read the file as UTF-8; the content is returned unmodified
    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let bytes = tokio::fs::read(locator)
            .await
            .inspect_err(|e| error!(locator, error = %e, "Failed to read text file"))?;
        let content = decode_utf8(bytes, locator)
            .inspect_err(|e| error!(locator, error = %e, "Text file is not UTF-8"))?;
        let line_count = content.lines().count();

        info!(locator, lines = line_count, "Read text file");

        Ok(ParsedDocument::new(
            DocumentType::Text,
            locator,
            title_from_locator(locator),
            content,
        )
        .with_metadata("extension", extension(locator).unwrap_or_default())
        .with_metadata("lineCount", line_count))
    }
}

/// Invalid UTF-8 is a `Parse` error rather than being replaced
pub(crate) fn decode_utf8(bytes: Vec<u8>, locator: &str) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| ExtractorError::Parse(format!("{} is not valid UTF-8: {}", locator, e)))
}
