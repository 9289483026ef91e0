//! Confluence page fetcher and HTML reducer

use super::types::ConfluencePage;
use crate::fetch::Fetcher;
use doc_extractor_common::{DocumentType, ExtractorConfig, ExtractorError, ParsedDocument, Result};
use scraper::{Html, Node};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::{form_urlencoded, Url};

const DEFAULT_TITLE: &str = "Confluence Page";
const CONTENT_API_PATH: &str = "/rest/api/content/";
const CONTENT_EXPAND: &str = "body.storage,space,version";

/// First path segments of Confluence routes; anything before them is the context path
const CONTEXT_MARKERS: &[&str] = &["pages", "display", "spaces", "rest", "plugins"];

/// Elements whose boundaries separate words in the rendered text
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "td", "th", "table", "h1", "h2", "h3", "h4", "h5",
    "h6", "pre", "blockquote", "hr", "section", "article",
];

/// Where a page lives in the REST content API
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageLocation {
    pub api_url: String,
    pub page_id: Option<String>,
}

/// Confluence extractor
///
/// The bearer token is captured at construction; a missing token is only
/// reported when a page is parsed.
#[derive(Clone)]
pub struct ConfluenceExtractor {
    token: Option<String>,
    fetcher: Arc<dyn Fetcher>,
}

impl ConfluenceExtractor {
    pub fn new(config: &ExtractorConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            token: config.confluence_token().map(String::from),
            fetcher,
        }
    }

    /// Claims locators mentioning `confluence` or `atlassian`
    pub fn can_handle(&self, locator: &str) -> bool {
        let lower = locator.to_ascii_lowercase();
        lower.contains("confluence") || lower.contains("atlassian")
    }

    pub async fn parse(&self, locator: &str) -> Result<ParsedDocument> {
        let token = self.token.as_deref().ok_or_else(|| {
            ExtractorError::Config(
                "Confluence token is not configured (set CONFLUENCE_TOKEN)".to_string(),
            )
        })?;

        let location = resolve_page_location(locator)
            .inspect_err(|e| error!(locator, error = %e, "Cannot resolve Confluence page"))?;
        debug!(locator, api_url = %location.api_url, "Fetching Confluence page");

        let raw = self
            .fetcher
            .fetch_json_with_bearer(&location.api_url, token)
            .await
            .inspect_err(|e| error!(locator, error = %e, "Failed to fetch Confluence page"))?;
        let page: ConfluencePage = serde_json::from_value(single_page(raw, locator)?)
            .inspect_err(|e| error!(locator, error = %e, "Unexpected Confluence response"))?;

        let title = page
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let content = page.body_html().map(html_to_text).unwrap_or_default();

        info!(locator, title = %title, chars = content.len(), "Extracted Confluence page");

        let mut document = ParsedDocument::new(DocumentType::Confluence, locator, title, content)
            .with_metadata("apiUrl", location.api_url);
        if let Some(page_id) = page.id.clone().or(location.page_id) {
            document = document.with_metadata("pageId", page_id);
        }
        if let Some(space_key) = page.space_key() {
            document = document.with_metadata("spaceKey", space_key);
        }
        if let Some(version) = page.version_number() {
            document = document.with_metadata("version", version as f64);
        }

        Ok(document)
    }
}

/// A content search (`/display/<space>/<title>`) answers with `{ "results": [..] }`
fn single_page(raw: Value, locator: &str) -> Result<Value> {
    let Some(results) = raw.get("results").and_then(Value::as_array) else {
        return Ok(raw);
    };
    results.first().cloned().ok_or_else(|| {
        ExtractorError::Parse(format!("No Confluence page found for {}", locator))
    })
}

/// Derive the REST content URL for a page locator
///
/// REST content URLs are used as given. Page ids come from a `/pages/<id>`
/// segment or a `pageId` query parameter, and `/display/<space>/<title>`
/// links become a content search. The deployment's context path (`/wiki`,
/// `/confluence`, ...) is kept. Any other URL is fetched as given.
pub(crate) fn resolve_page_location(locator: &str) -> Result<PageLocation> {
    let url = Url::parse(locator.trim()).map_err(|e| {
        ExtractorError::Parse(format!("Invalid Confluence URL {}: {}", locator, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractorError::Parse(format!(
            "Confluence locator must be an http(s) URL: {}",
            locator
        )));
    }

    let as_given = |page_id: Option<String>| PageLocation {
        api_url: url.to_string(),
        page_id,
    };

    if let Some((_, rest)) = url.path().split_once(CONTENT_API_PATH) {
        let page_id = rest
            .split('/')
            .next()
            .filter(|id| !id.is_empty())
            .map(String::from);
        return Ok(as_given(page_id));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let marker = segments.iter().position(|s| CONTEXT_MARKERS.contains(s));
    let context = context_path(&segments, marker);
    let origin = url.origin().ascii_serialization();

    let page_id = segments
        .windows(2)
        .find(|pair| pair[0] == "pages" && pair[1] != "viewpage.action")
        .map(|pair| pair[1].to_string())
        .or_else(|| {
            url.query_pairs()
                .find(|(key, _)| key == "pageId")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|id| !id.is_empty());

    if let Some(page_id) = page_id {
        return Ok(PageLocation {
            api_url: format!(
                "{}{}{}{}?expand={}",
                origin, context, CONTENT_API_PATH, page_id, CONTENT_EXPAND
            ),
            page_id: Some(page_id),
        });
    }

    if let Some(index) = marker.filter(|&i| segments[i] == "display") {
        if let (Some(space_key), Some(title)) = (segments.get(index + 1), segments.get(index + 2)) {
            let title = form_urlencoded::parse(title.as_bytes())
                .next()
                .map(|(decoded, _)| decoded.into_owned())
                .unwrap_or_default();
            let search: String = form_urlencoded::Serializer::new(String::new())
                .append_pair("spaceKey", space_key)
                .append_pair("title", &title)
                .append_pair("expand", CONTENT_EXPAND)
                .finish();
            return Ok(PageLocation {
                api_url: format!("{}{}/rest/api/content?{}", origin, context, search),
                page_id: None,
            });
        }
    }

    Ok(as_given(None))
}

/// Path segments ahead of the first Confluence route, e.g. `/wiki`
fn context_path(segments: &[&str], marker: Option<usize>) -> String {
    let prefix = match marker {
        Some(index) => &segments[..index],
        None => &segments[..segments.len().saturating_sub(1)],
    };
    prefix.iter().map(|s| format!("/{}", s)).collect()
}

/// Visible text of an HTML fragment, whitespace runs collapsed to one space
pub(crate) fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                    .is_some_and(|name| name == "script" || name == "style");
                if !hidden {
                    raw.push_str(text);
                }
            }
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => raw.push(' '),
            _ => {}
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
