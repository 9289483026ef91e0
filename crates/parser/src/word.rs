//! Word (.docx) extractor

use crate::blocking::run_blocking;
use crate::locator::{has_extension, title_from_locator};
use doc_extractor_common::{DocumentType, ExtractorError, ParsedDocument, Result};
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct WordExtractor;

impl WordExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn can_handle(&self, locator: &str) -> bool {
        has_extension(locator, &["docx"])
    }

    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let bytes = tokio::fs::read(locator)
            .await
            .inspect_err(|e| error!(locator, error = %e, "Failed to read Word document"))?;

        let (content, paragraph_count) = run_blocking("Word", move || decode_docx(&bytes))
            .await
            .inspect_err(|e| error!(locator, error = %e, "Word extraction failed"))?;

        info!(locator, paragraphs = paragraph_count, "Extracted Word document");

        Ok(
            ParsedDocument::new(DocumentType::Word, locator, title_from_locator(locator), content)
                .with_metadata("paragraphCount", paragraph_count),
        )
    }
}

/// Body text with one line per paragraph or table row, and the body paragraph count
fn decode_docx(bytes: &[u8]) -> Result<(String, usize)> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractorError::Parse(format!("Failed to parse DOCX: {}", e)))?;

    let mut lines = Vec::new();
    let mut paragraph_count = 0;

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                paragraph_count += 1;
                lines.push(paragraph_text(paragraph));
            }
            DocumentChild::Table(table) => lines.extend(table_rows(table)),
            _ => {}
        }
    }

    Ok((lines.join("\n").trim_end().to_string(), paragraph_count))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, &mut text),
            ParagraphChild::Hyperlink(link) => {
                for link_child in &link.children {
                    if let ParagraphChild::Run(run) = link_child {
                        push_run_text(run, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &Run, output: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => output.push_str(&text.text),
            RunChild::Tab(_) => output.push('\t'),
            _ => {}
        }
    }
}

/// One line per row, cell texts joined with ` | `
fn table_rows(table: &Table) -> Vec<String> {
    table
        .rows
        .iter()
        .map(|row| {
            let docx_rs::TableChild::TableRow(row) = row;
            row.cells
                .iter()
                .map(|cell| {
                    let docx_rs::TableRowChild::TableCell(cell) = cell;
                    cell.children
                        .iter()
                        .filter_map(|content| match content {
                            docx_rs::TableCellContent::Paragraph(paragraph) => {
                                Some(paragraph_text(paragraph))
                            }
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, TableCell, TableRow};

    fn text_paragraph(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    fn write_docx(docx: Docx) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new()
            .prefix("handbook")
            .suffix(".docx")
            .tempfile()
            .unwrap();
        docx.build().pack(file.reopen().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_can_handle() {
        let extractor = WordExtractor::new();
        assert!(extractor.can_handle("docs/handbook.docx"));
        assert!(extractor.can_handle("docs/HANDBOOK.DOCX"));
        assert!(!extractor.can_handle("docs/handbook.doc"));
        assert!(!extractor.can_handle("docs/handbook.pdf"));
    }

    #[test]
    fn test_decode_rejects_non_docx() {
        let result = decode_docx(b"plain bytes, not a zip archive");
        assert!(matches!(result, Err(ExtractorError::Parse(_))));
    }

    #[tokio::test]
    async fn test_parse_paragraphs_and_tables() {
        let docx = Docx::new()
            .add_paragraph(text_paragraph("Onboarding"))
            .add_paragraph(text_paragraph("Read the API guide first."))
            .add_table(Table::new(vec![
                TableRow::new(vec![
                    TableCell::new().add_paragraph(text_paragraph("Endpoint")),
                    TableCell::new().add_paragraph(text_paragraph("Owner")),
                ]),
                TableRow::new(vec![
                    TableCell::new().add_paragraph(text_paragraph("/users")),
                    TableCell::new().add_paragraph(text_paragraph("Identity")),
                ]),
            ]));
        let file = write_docx(docx);
        let locator = file.path().to_str().unwrap();

        let document = WordExtractor::new().parse(locator).await.unwrap();

        assert_eq!(document.document_type, DocumentType::Word);
        assert_eq!(document.title, title_from_locator(locator));
        assert!(document.title.starts_with("handbook"));
        assert_eq!(
            document.content,
            "Onboarding\nRead the API guide first.\nEndpoint | Owner\n/users | Identity"
        );
        assert_eq!(document.metadata["paragraphCount"].as_number(), Some(2.0));
    }
}
