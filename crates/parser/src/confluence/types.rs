//! Confluence REST content API payloads

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A page as returned by `GET /rest/api/content/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfluencePage {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub body: Option<PageBody>,

    #[serde(default)]
    pub space: Option<SpaceRef>,

    #[serde(default)]
    pub version: Option<PageVersion>,
}

impl ConfluencePage {
    /// The storage-format HTML, falling back to a raw string body
    pub fn body_html(&self) -> Option<&str> {
        match self.body.as_ref()? {
            PageBody::Storage { storage } => Some(&storage.value),
            PageBody::Raw(raw) => Some(raw),
            PageBody::Other(_) => None,
        }
    }

    pub fn space_key(&self) -> Option<&str> {
        self.space.as_ref()?.key.as_deref()
    }

    pub fn version_number(&self) -> Option<u64> {
        self.version.as_ref()?.number
    }
}

/// Page ids are strings in the REST API but numbers in some exports
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// `body` is normally `{ "storage": { "value": "<p>..</p>" } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageBody {
    Storage { storage: StorageBody },
    Raw(String),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageBody {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceRef {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageVersion {
    #[serde(default)]
    pub number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_body() {
        let page: ConfluencePage = serde_json::from_value(json!({
            "id": "42",
            "title": "Runbook",
            "body": { "storage": { "value": "<p>Restart</p>", "representation": "storage" } },
            "space": { "key": "OPS" },
            "version": { "number": 7 }
        }))
        .unwrap();

        assert_eq!(page.body_html(), Some("<p>Restart</p>"));
        assert_eq!(page.id.as_deref(), Some("42"));
        assert_eq!(page.space_key(), Some("OPS"));
        assert_eq!(page.version_number(), Some(7));
    }

    #[test]
    fn test_lenient_page_fields() {
        let page: ConfluencePage = serde_json::from_value(json!({
            "id": 4711,
            "title": "Runbook",
            "space": { "name": "Operations" },
            "version": { "when": "2024-05-01T10:00:00Z" }
        }))
        .unwrap();

        assert_eq!(page.id.as_deref(), Some("4711"));
        assert_eq!(page.space_key(), None);
        assert_eq!(page.version_number(), None);

        let page: ConfluencePage = serde_json::from_value(json!({ "id": null })).unwrap();
        assert_eq!(page.id, None);
    }

    #[test]
    fn test_raw_and_unknown_bodies() {
        let raw: ConfluencePage =
            serde_json::from_value(json!({ "body": "<b>plain</b>" })).unwrap();
        assert_eq!(raw.body_html(), Some("<b>plain</b>"));

        let unknown: ConfluencePage =
            serde_json::from_value(json!({ "body": { "view": { "value": "x" } } })).unwrap();
        assert_eq!(unknown.body_html(), None);

        let empty: ConfluencePage = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.body_html(), None);
        assert!(empty.title.is_none());
    }
}
