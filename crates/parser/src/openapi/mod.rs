//! OpenAPI / Swagger specification extractor
//!
//! Loads a Swagger 2.0 or OpenAPI 3.x document (JSON or YAML, local or
//! remote), validates its structure, and flattens it into the normalized
//! [`Endpoint`](doc_extractor_common::Endpoint) model.
//!
//! The document is kept as a `serde_json::Value` tree: its shape is not known
//! ahead of validation, so every lookup goes through absent-safe accessors
//! and missing optional fields degrade to documented defaults.
//!
//! ## Usage
//! ```rust,ignore
//! use doc_extractor_parser::openapi::{self, OpenApiExtractor};
//!
//! let extractor = OpenApiExtractor::new(fetcher);
//! let spec = extractor.parse_source("petstore.yaml").await?;
//! let endpoints = openapi::extract_endpoints(&spec);
//! let user = openapi::get_schema(&spec, "#/components/schemas/User");
//! ```

mod converter;
mod parser;
mod schema;
mod validator;

pub use converter::extract_endpoints;
pub use parser::OpenApiExtractor;
pub use schema::{get_schema, validate_against_schema};
pub use validator::validate_document;
