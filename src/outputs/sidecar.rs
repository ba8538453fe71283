//! URL sidecar file.
//!
//! Written right after collection so an interrupted run still leaves the list
//! of addresses behind. The pipeline never reads it back.

use super::artifact_name;
use crate::error::CrawlError;
use crate::models::{DateRange, UrlSet};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Path of the sidecar for a crawl.
pub fn sidecar_path(output_dir: &Path, keyword: &str, range: DateRange) -> PathBuf {
    output_dir.join(artifact_name(keyword, "urls", range, "txt"))
}

/// Write `urls` one per line, sorted, and return the file path.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn write_url_list(
    output_dir: &Path,
    keyword: &str,
    range: DateRange,
    urls: &UrlSet,
) -> Result<PathBuf, CrawlError> {
    let path = sidecar_path(output_dir, keyword, range);
    let contents: String = urls.iter().sorted().map(|url| format!("{url}\n")).collect();
    fs::write(&path, contents).await?;
    info!(path = %path.display(), "Wrote url sidecar");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_url_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let range = DateRange::parse("2023-01-01", "2023-01-02").unwrap();
        let urls: UrlSet = [
            "https://n.news.naver.com/article/002/2",
            "https://n.news.naver.com/article/001/1",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let path = write_url_list(dir.path(), "test", range, &urls).await.unwrap();
        assert_eq!(path, dir.path().join("test_urls_2023-01-01_2023-01-02.txt"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "https://n.news.naver.com/article/001/1\nhttps://n.news.naver.com/article/002/2\n"
        );
    }

    #[tokio::test]
    async fn test_empty_set_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let range = DateRange::parse("2023-01-01", "2023-01-01").unwrap();
        let path = write_url_list(dir.path(), "test", range, &UrlSet::new())
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");
    }
}
