//! Runs synchronous decoders off the async runtime

use doc_extractor_common::{ExtractorError, Result};

/// Run a blocking decode on tokio's blocking pool
pub(crate) async fn run_blocking<T, F>(format: &str, task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        ExtractorError::Parse(format!("{} decoder task failed: {}", format, e))
    })?
}
