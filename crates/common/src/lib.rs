//! Common types and utilities for doc-extractor
//!
//! This crate contains the normalized document model every extractor produces,
//! the error taxonomy, and the configuration shared by the parser and CLI
//! components.

mod config;
mod document;
mod endpoint;

pub use config::{ExtractorConfig, CONFLUENCE_TOKEN_ENV};
pub use document::{DocumentType, Metadata, MetadataValue, ParsedDocument};
pub use endpoint::{
    Endpoint, HttpMethod, Parameter, ParameterLocation, RequestBody, Response, ValidationResult,
};

use thiserror::Error;

/// Errors that can occur while extracting a document
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// A required credential or setting is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// An API specification failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A decoder rejected the input
    #[error("Parse error: {0}")]
    Parse(String),

    /// No registered extractor accepts the locator
    #[error("Unsupported locator: {0}")]
    UnsupportedLocator(String),

    /// Network failure or non-success HTTP status
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, ExtractorError>;
