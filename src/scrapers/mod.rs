//! Site adapters.
//!
//! All knowledge of a portal's page layout lives behind [`NewsSite`]: how to
//! build a search page address, how to read a results page, and how to pull
//! an article out of its page. The collector, extractor and pipeline only
//! talk to this trait, so a layout change touches one adapter module.
//!
//! # Supported Sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Naver News | [`naver`] | Daily search listing, `n.news.naver.com` article pages |

use crate::error::CrawlError;
use crate::fetcher::Document;
use crate::models::ArticleRecord;
use chrono::NaiveDate;

pub mod naver;

pub trait NewsSite {
    /// Address of results page `page` (zero-based) for `keyword` on `day`.
    fn search_url(&self, keyword: &str, day: NaiveDate, page: u32) -> String;

    /// Whether the results page says nothing matched.
    fn is_empty_results(&self, doc: &Document) -> bool;

    /// Article links on a results page that belong in the crawl.
    fn article_links(&self, doc: &Document) -> Vec<String>;

    /// Whether the results page has an enabled "next page" control.
    fn has_next_page(&self, doc: &Document) -> bool;

    /// Extract an article.
    ///
    /// `Ok(None)` means the page has no article body, which callers treat as
    /// a transient failure. Any other missing piece is an error.
    fn parse_article(&self, url: &str, doc: &Document) -> Result<Option<ArticleRecord>, CrawlError>;
}
