//! Confluence page extractor
//!
//! Pages are fetched through the Confluence REST content API with a bearer
//! token and their storage-format body is reduced to plain text.
//!
//! ## Accepted locators
//!
//! - Page URLs: `https://acme.atlassian.net/wiki/spaces/ENG/pages/12345/Title`
//! - Legacy view URLs: `https://wiki.acme.com/pages/viewpage.action?pageId=12345`
//! - REST URLs, used as given: `https://wiki.acme.com/rest/api/content/12345?expand=body.storage`

mod parser;
mod types;

pub use parser::ConfluenceExtractor;
pub use types::*;
