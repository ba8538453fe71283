//! JSON output for crawl results and analysis reports.

use super::artifact_name;
use crate::error::CrawlError;
use crate::models::{ArticleCollection, DateRange};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub fn collection_path(output_dir: &Path, keyword: &str, range: DateRange) -> PathBuf {
    output_dir.join(artifact_name(keyword, "articles", range, "json"))
}

/// Write an [`ArticleCollection`] next to its URL sidecar.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), count = collection.len()))]
pub async fn write_collection(
    collection: &ArticleCollection,
    output_dir: &Path,
) -> Result<PathBuf, CrawlError> {
    let range = DateRange::new(collection.start, collection.end)?;
    let path = collection_path(output_dir, &collection.keyword, range);

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }
    write_json(collection, &path).await?;
    Ok(path)
}

/// Load a collection written by [`write_collection`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_collection(path: &Path) -> Result<ArticleCollection, CrawlError> {
    let raw = fs::read_to_string(path).await?;
    let collection: ArticleCollection = serde_json::from_str(&raw)?;
    info!(
        keyword = %collection.keyword,
        count = collection.len(),
        "Loaded article collection"
    );
    Ok(collection)
}

/// Pretty-print any serializable value to `path`.
pub async fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), CrawlError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).await?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(())
}
