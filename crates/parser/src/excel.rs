//! Spreadsheet extractor (Excel, OpenDocument and CSV)
//!
//! Every sheet is rendered as CSV under a `Sheet: <name>` header line, and the
//! sheet names are recorded in the document metadata.

use crate::blocking::run_blocking;
use crate::locator::{extension, has_extension, title_from_locator};
use crate::text::decode_utf8;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use doc_extractor_common::{DocumentType, ExtractorError, ParsedDocument, Result};
use std::io::Cursor;
use tracing::{error, info, warn};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

/// One decoded sheet
#[derive(Debug, Clone, PartialEq)]
struct Sheet {
    name: String,
    csv: String,
}

/// Decoded workbook: every sheet name, plus the sheets that could be read
#[derive(Debug, Default)]
struct Workbook {
    sheet_names: Vec<String>,
    sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelExtractor;

impl ExcelExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn can_handle(&self, locator: &str) -> bool {
        has_extension(locator, WORKBOOK_EXTENSIONS)
    }

    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let bytes = tokio::fs::read(locator)
            .await
            .inspect_err(|e| error!(locator, error = %e, "Failed to read spreadsheet"))?;
        let title = title_from_locator(locator);

        let workbook = if extension(locator).as_deref() == Some("csv") {
            let csv = decode_utf8(bytes, locator)
                .inspect_err(|e| error!(locator, error = %e, "CSV file is not UTF-8"))?;
            let name = title.clone();
            Workbook {
                sheet_names: vec![name.clone()],
                sheets: vec![Sheet {
                    name,
                    csv: csv.trim_end().to_string(),
                }],
            }
        } else {
            run_blocking("Spreadsheet", move || read_workbook(bytes))
                .await
                .inspect_err(|e| error!(locator, error = %e, "Spreadsheet extraction failed"))?
        };

        info!(
            locator,
            sheets = workbook.sheet_names.len(),
            "Extracted spreadsheet"
        );

        let content = render_sheets(&workbook.sheets);
        let sheet_count = workbook.sheet_names.len();

        Ok(
            ParsedDocument::new(DocumentType::Excel, locator, title, content)
                .with_metadata("sheetNames", workbook.sheet_names)
                .with_metadata("sheetCount", sheet_count),
        )
    }
}

fn read_workbook(bytes: Vec<u8>) -> Result<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractorError::Parse(format!("Failed to open workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        match workbook.worksheet_range(name) {
            Ok(range) => sheets.push(Sheet {
                name: name.clone(),
                csv: range_to_csv(&range),
            }),
            Err(e) => warn!(sheet = %name, error = %e, "Skipping unreadable sheet"),
        }
    }

    Ok(Workbook {
        sheet_names,
        sheets,
    })
}

/// `Sheet: <name>` header followed by the sheet's CSV, sheets separated by a blank line
fn render_sheets(sheets: &[Sheet]) -> String {
    sheets
        .iter()
        .map(|sheet| format!("Sheet: {}\n{}", sheet.name, sheet.csv))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn range_to_csv(range: &Range<Data>) -> String {
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| escape_csv_field(&cell.to_string()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote a field when it contains a delimiter, quote or line break
fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
