//! Crawl pipeline: collect URLs, write the sidecar, then drain the URLs
//! through the article extractor.
//!
//! All per-run state lives in a [`CrawlRun`] created inside [`NewsCrawler::run`],
//! so one crawler can serve any number of crawls without them seeing each
//! other's URLs or records.

use crate::collector::collect_urls;
use crate::config::CrawlerConfig;
use crate::error::CrawlError;
use crate::extractor::extract_article;
use crate::fetcher::{Fetcher, HttpTransport, Transport};
use crate::models::{ArticleCollection, DateRange, FailedArticle, ISO_DATE_FORMAT, UrlSet};
use crate::outputs::sidecar::write_url_list;
use crate::pacing::{Pacer, PacingPolicy, Pause};
use crate::scrapers::NewsSite;
use crate::scrapers::naver::NaverNews;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Working state of a single crawl.
#[derive(Debug)]
struct CrawlRun {
    collection: ArticleCollection,
    /// Popped from the back; a retried URL goes straight back on top.
    queue: Vec<String>,
    attempts: HashMap<String, u32>,
    total: usize,
}

impl CrawlRun {
    fn new(keyword: &str, range: DateRange, urls: UrlSet) -> Self {
        let queue: Vec<String> = urls.into_iter().collect();
        Self {
            collection: ArticleCollection::new(keyword, range),
            total: queue.len(),
            queue,
            attempts: HashMap::new(),
        }
    }

    /// Count an empty-body attempt; re-queue `url` or give up on it.
    fn retry_or_fail(&mut self, url: String, max_attempts: u32) {
        let attempts = self.attempts.entry(url.clone()).or_insert(0);
        *attempts += 1;
        if *attempts < max_attempts {
            self.queue.push(url);
        } else {
            warn!(%url, attempts = *attempts, "Giving up on article without body");
            let attempts = *attempts;
            self.collection.failed.push(FailedArticle { url, attempts });
        }
    }
}

/// Drives collection and extraction for one site.
#[derive(Debug)]
pub struct NewsCrawler<T, S> {
    fetcher: Fetcher<T>,
    site: S,
    pacing: PacingPolicy,
    last_page: u32,
    max_attempts: u32,
    output_dir: PathBuf,
}

impl NewsCrawler<HttpTransport, NaverNews> {
    /// A Naver News crawler talking to the live portal.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let pacing = config.pacing();
        let fetcher = Fetcher::new(
            HttpTransport::new(&config.user_agent)?,
            pacing.transport_cooldown,
        );
        Ok(Self::new(fetcher, NaverNews, config))
    }
}

impl<T, S> NewsCrawler<T, S>
where
    T: Transport,
    S: NewsSite,
{
    pub fn new(fetcher: Fetcher<T>, site: S, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            site,
            pacing: config.pacing(),
            last_page: config.last_page,
            max_attempts: config.max_attempts.max(1),
            output_dir: config.output_dir.clone(),
        }
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Crawl every article about `keyword` published over `range`.
    ///
    /// The URL sidecar is written before extraction starts. An empty URL set
    /// is reported as [`CrawlError::EmptyUrlSet`] after the (empty) sidecar
    /// is written.
    #[instrument(level = "info", skip(self, range), fields(range = %range))]
    pub async fn run(&self, keyword: &str, range: DateRange) -> Result<ArticleCollection, CrawlError> {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(self.pacing);

        info!("Collecting news url list");
        let urls = collect_urls(&self.fetcher, &self.site, &mut pacer, keyword, range, self.last_page).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        write_url_list(&self.output_dir, keyword, range, &urls).await?;

        if urls.is_empty() {
            return Err(CrawlError::EmptyUrlSet {
                keyword: keyword.to_string(),
                start: range.start().format(ISO_DATE_FORMAT).to_string(),
                end: range.end().format(ISO_DATE_FORMAT).to_string(),
            });
        }

        let mut run = CrawlRun::new(keyword, range, urls);
        info!(total = run.total, "Crawling started from collected urls");
        self.drain(&mut run, &mut pacer).await?;

        let collection = run.collection;
        info!(
            collected = collection.articles.len(),
            failed = collection.failed.len(),
            elapsed_secs = t0.elapsed().as_secs(),
            "Crawling finished"
        );
        Ok(collection)
    }

    async fn drain(&self, run: &mut CrawlRun, pacer: &mut Pacer) -> Result<(), CrawlError> {
        while let Some(url) = run.queue.pop() {
            match extract_article(&self.fetcher, &self.site, &url).await? {
                Some(record) => run.collection.articles.push(record),
                None => run.retry_or_fail(url, self.max_attempts),
            }
            info!(
                collected = run.collection.articles.len(),
                total = run.total,
                "Progress"
            );
            pacer.pause(Pause::Article).await;
        }
        Ok(())
    }
}
