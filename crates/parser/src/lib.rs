//! Document knowledge extraction
//!
//! This crate turns heterogeneous documents into the common
//! [`ParsedDocument`](doc_extractor_common::ParsedDocument) representation.
//!
//! ## Supported Sources
//!
//! - **Swagger / OpenAPI** specs (JSON or YAML, local or remote), flattened
//!   into endpoints with `$ref` resolution and shallow schema validation
//! - **PDF**, **Excel/CSV** and **Word** files, reduced to plain text
//! - **Confluence** pages, fetched with a bearer token
//! - **Text** files of common textual formats
//!
//! ## Usage
//! ```rust,ignore
//! use doc_extractor_common::ExtractorConfig;
//! use doc_extractor_parser::ParserRegistry;
//!
//! let registry = ParserRegistry::new(&ExtractorConfig::from_env())?;
//! let document = registry.parse("specs/petstore.yaml").await?;
//! println!("{} endpoints", document.endpoints.map_or(0, |e| e.len()));
//! ```

mod blocking;
mod confluence;
mod excel;
mod fetch;
mod locator;
pub mod openapi;
mod pdf;
mod registry;
mod text;
mod word;

pub use confluence::{ConfluenceExtractor, ConfluencePage};
pub use excel::ExcelExtractor;
pub use fetch::{Fetcher, HttpFetcher};
pub use openapi::{
    extract_endpoints, get_schema, validate_against_schema, validate_document, OpenApiExtractor,
};
pub use pdf::PdfExtractor;
pub use registry::{Extractor, ParserRegistry, SUPPORTED_FORMATS};
pub use text::TextExtractor;
pub use word::WordExtractor;
