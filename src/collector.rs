//! Article URL collection from daily search listings.
//!
//! Each day in the range is searched separately. Pages are walked until the
//! listing reports no results, the next-page control is missing or disabled,
//! or the page ceiling is reached. Links from every page land in one
//! [`UrlSet`], so an article listed on several days is kept once.

use crate::error::CrawlError;
use crate::fetcher::{Fetcher, Transport};
use crate::models::{DateRange, QUERY_DATE_FORMAT, UrlSet};
use crate::pacing::{Pacer, Pause};
use crate::scrapers::NewsSite;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

/// Collect article URLs for `keyword` over every day of `range`.
///
/// At most `last_page + 1` result pages are fetched per day.
#[instrument(level = "info", skip(fetcher, site, pacer, range), fields(range = %range))]
pub async fn collect_urls<T, S>(
    fetcher: &Fetcher<T>,
    site: &S,
    pacer: &mut Pacer,
    keyword: &str,
    range: DateRange,
    last_page: u32,
) -> Result<UrlSet, CrawlError>
where
    T: Transport,
    S: NewsSite,
{
    let mut urls = UrlSet::new();
    for day in range.days() {
        info!(
            day = %day.format(QUERY_DATE_FORMAT),
            found = urls.len(),
            "Collecting article urls"
        );
        let pages = collect_day(fetcher, site, pacer, keyword, day, last_page, &mut urls).await?;
        debug!(day = %day, pages, found = urls.len(), "Finished day");
        pacer.pause(Pause::Day).await;
    }
    info!(found = urls.len(), "Collected article urls");
    Ok(urls)
}

/// Walk the result pages of one day, returning how many pages were fetched.
async fn collect_day<T, S>(
    fetcher: &Fetcher<T>,
    site: &S,
    pacer: &mut Pacer,
    keyword: &str,
    day: NaiveDate,
    last_page: u32,
    urls: &mut UrlSet,
) -> Result<u32, CrawlError>
where
    T: Transport,
    S: NewsSite,
{
    let mut fetched = 0;
    for page in 0..=last_page {
        let url = site.search_url(keyword, day, page);
        let doc = fetcher.fetch(&url).await?;
        fetched += 1;

        if site.is_empty_results(&doc) {
            debug!(page, "No results; stopping day");
            break;
        }

        let before = urls.len();
        urls.extend(site.article_links(&doc));
        debug!(page, added = urls.len() - before, "Scanned results page");

        if !site.has_next_page(&doc) {
            debug!(page, "No next page; stopping day");
            break;
        }
        drop(doc);
        pacer.pause(Pause::Page).await;
    }
    Ok(fetched)
}
