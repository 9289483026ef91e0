//! Extractor configuration
//!
//! Settings can come from an optional YAML file and from the process
//! environment; the environment wins when both supply a value.

use crate::{ExtractorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable carrying the Confluence bearer token
pub const CONFLUENCE_TOKEN_ENV: &str = "CONFLUENCE_TOKEN";

/// Settings consumed by the extractors
///
/// Example YAML:
/// ```yaml
/// confluence_token: "abc123"
/// user_agent: "doc-extractor/0.1"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Bearer token for Confluence REST calls
    #[serde(default)]
    pub confluence_token: Option<String>,

    /// User-Agent header for outbound HTTP requests
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ExtractorConfig {
    /// Build a configuration from the environment only
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ExtractorError::Config(format!(
                "Failed to parse config YAML from {:?}: {}",
                path, e
            ))
        })
    }

    /// Apply values present in the process environment
    pub fn with_env_overrides(self) -> Self {
        self.override_token(std::env::var(CONFLUENCE_TOKEN_ENV).ok())
    }

    pub fn with_confluence_token(mut self, token: impl Into<String>) -> Self {
        self.confluence_token = Some(token.into());
        self
    }

    /// The Confluence token, if one is configured and non-blank
    pub fn confluence_token(&self) -> Option<&str> {
        self.confluence_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn override_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.confluence_token = Some(token);
        }
        self
    }
}
