//! PDF extractor
//!
//! Text comes from `pdf-extract`; the page count from `lopdf`.

use crate::blocking::run_blocking;
use crate::locator::{has_extension, title_from_locator};
use doc_extractor_common::{DocumentType, ExtractorError, ParsedDocument, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn can_handle(&self, locator: &str) -> bool {
        has_extension(locator, &["pdf"])
    }

    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let bytes = tokio::fs::read(locator)
            .await
            .inspect_err(|e| error!(locator, error = %e, "Failed to read PDF"))?;
        debug!(locator, size = bytes.len(), "Read PDF");

        let (text, page_count) = run_blocking("PDF", move || decode_pdf(&bytes))
            .await
            .inspect_err(|e| error!(locator, error = %e, "PDF extraction failed"))?;

        info!(locator, chars = text.len(), pages = page_count, "Extracted PDF");

        Ok(
            ParsedDocument::new(DocumentType::Pdf, locator, title_from_locator(locator), text)
                .with_metadata("pageCount", page_count),
        )
    }
}

/// Returns the extracted text verbatim and the number of pages
fn decode_pdf(bytes: &[u8]) -> Result<(String, usize)> {
    // pdf-extract and its font parsers can panic on malformed input
    catch_unwind(AssertUnwindSafe(|| {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractorError::Parse(format!("Failed to open PDF: {}", e)))?;
        let page_count = document.get_pages().len();

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractorError::Parse(format!("PDF text extraction failed: {}", e)))?;

        Ok((text, page_count))
    }))
    .unwrap_or_else(|_| {
        Err(ExtractorError::Parse(
            "PDF decoder panicked on malformed input".to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;

    /// One page of Courier text per entry in `lines`
    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_can_handle() {
        let extractor = PdfExtractor::new();
        assert!(extractor.can_handle("reports/q3.pdf"));
        assert!(extractor.can_handle("reports/Q3.PDF"));
        assert!(!extractor.can_handle("reports/q3.pdf.txt"));
        assert!(!extractor.can_handle("reports/q3.docx"));
    }

    #[test]
    fn test_decode_rejects_non_pdf() {
        let result = decode_pdf(b"this is not a pdf");
        assert!(matches!(result, Err(ExtractorError::Parse(_))));
    }

    #[tokio::test]
    async fn test_parse_missing_file() {
        let result = PdfExtractor::new().parse("/nonexistent/report.pdf").await;
        assert!(matches!(result, Err(ExtractorError::Io(_))));
    }

    #[tokio::test]
    async fn test_parse_corrupt_file() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4\nbroken").unwrap();

        let result = PdfExtractor::new()
            .parse(file.path().to_str().unwrap())
            .await;
        assert!(matches!(result, Err(ExtractorError::Parse(_))));
    }

    #[test]
    fn test_decode_counts_pages() {
        let bytes = build_pdf(&["Quarterly report", "Appendix"]);
        let (text, page_count) = decode_pdf(&bytes).unwrap();

        assert_eq!(page_count, 2);
        assert!(text.contains("Quarterly report"), "{:?}", text);
        assert!(text.contains("Appendix"), "{:?}", text);
    }

    #[tokio::test]
    async fn test_parse_pdf() {
        let bytes = build_pdf(&["Hello World"]);
        let mut file = tempfile::Builder::new()
            .prefix("summary")
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        file.write_all(&bytes).unwrap();
        let locator = file.path().to_str().unwrap();

        let document = PdfExtractor::new().parse(locator).await.unwrap();

        assert_eq!(document.document_type, DocumentType::Pdf);
        assert!(document.title.starts_with("summary"));
        assert_eq!(
            document.content,
            pdf_extract::extract_text_from_mem(&bytes).unwrap()
        );
        assert!(document.content.contains("Hello World"));
        assert_eq!(document.metadata["pageCount"].as_number(), Some(1.0));
        assert_eq!(document.source(), Some(locator));
    }
}
