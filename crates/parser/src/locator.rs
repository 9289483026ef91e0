//! Locator inspection helpers
//!
//! A locator is either a filesystem path or an http(s) URL. These helpers
//! only look at the string; they never touch the filesystem or network.

use std::path::Path;
use url::Url;

/// Whether the locator is an http(s) URL
pub(crate) fn is_remote(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// The path portion of a locator (URL query and fragment removed)
fn path_part(locator: &str) -> String {
    if is_remote(locator) {
        if let Ok(url) = Url::parse(locator.trim()) {
            return url.path().to_string();
        }
    }
    locator.to_string()
}

/// Lower-cased file extension of the locator, if any
pub(crate) fn extension(locator: &str) -> Option<String> {
    Path::new(&path_part(locator))
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

pub(crate) fn has_extension(locator: &str, extensions: &[&str]) -> bool {
    extension(locator).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Display title: the file name with its extension stripped
pub(crate) fn title_from_locator(locator: &str) -> String {
    Path::new(&path_part(locator))
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| locator.to_string())
}
