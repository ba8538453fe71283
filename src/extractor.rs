//! Single-article extraction.

use crate::error::CrawlError;
use crate::fetcher::{Fetcher, Transport};
use crate::models::ArticleRecord;
use crate::scrapers::NewsSite;
use crate::utils::truncate_for_log;
use tracing::{debug, instrument, warn};

/// Fetch one article page and extract its record.
///
/// `Ok(None)` signals a page without an article body; the caller decides
/// whether to try again. Missing header fields and transport failures are
/// returned as errors.
#[instrument(level = "debug", skip(fetcher, site))]
pub async fn extract_article<T, S>(
    fetcher: &Fetcher<T>,
    site: &S,
    url: &str,
) -> Result<Option<ArticleRecord>, CrawlError>
where
    T: Transport,
    S: NewsSite,
{
    let doc = fetcher.fetch(url).await?;
    let record = site.parse_article(url, &doc)?;
    match &record {
        Some(article) => debug!(
            %url,
            title = %truncate_for_log(&article.title, 40),
            media = %article.media,
            date = %article.date,
            chars = article.text.chars().count(),
            "Extracted article"
        ),
        None => warn!(%url, "Article page has no body"),
    }
    Ok(record)
}
