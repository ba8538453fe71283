//! Data models for crawled articles and the date ranges they are crawled over.
//!
//! - [`DateRange`]: inclusive span of calendar days to search
//! - [`UrlSet`]: deduplicated article addresses gathered during collection
//! - [`ArticleRecord`]: one extracted article
//! - [`ArticleCollection`]: the output of a crawl run

use crate::error::CrawlError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Article addresses, unique by exact string match.
pub type UrlSet = HashSet<String>;

/// Date format used in search queries.
pub const QUERY_DATE_FORMAT: &str = "%Y.%m.%d";

/// Date format used for input, file names and article records.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar days.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CrawlError> {
        if start > end {
            return Err(CrawlError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse both ends, accepting either `YYYY-MM-DD` or `YYYY.MM.DD`.
    pub fn parse(start: &str, end: &str) -> Result<Self, CrawlError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every day in the range, in increasing order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut day = self.start;
        while day <= self.end {
            days.push(day);
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }
        days
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(ISO_DATE_FORMAT),
            self.end.format(ISO_DATE_FORMAT)
        )
    }
}

/// Parse a calendar date written as `YYYY-MM-DD` or `YYYY.MM.DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, CrawlError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, QUERY_DATE_FORMAT))
        .map_err(|_| CrawlError::InvalidDate {
            value: value.to_string(),
        })
}

/// One article as extracted from its page.
///
/// Records are all-or-nothing: extraction either fills every field or
/// produces no record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The article address the record was extracted from.
    pub url: String,
    /// Body text with surrounding whitespace trimmed and newlines/tabs removed.
    pub text: String,
    pub title: String,
    /// Publisher name.
    pub media: String,
    /// Publication day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

/// An article address given up on after repeated empty-body responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FailedArticle {
    pub url: String,
    pub attempts: u32,
}

/// The result of one crawl run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArticleCollection {
    pub keyword: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Articles in the order they were extracted.
    pub articles: Vec<ArticleRecord>,
    /// Addresses that never yielded a body within the attempt limit.
    #[serde(default)]
    pub failed: Vec<FailedArticle>,
}

impl ArticleCollection {
    pub fn new(keyword: &str, range: DateRange) -> Self {
        Self {
            keyword: keyword.to_string(),
            start: range.start(),
            end: range.end(),
            articles: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Body texts, in collection order.
    pub fn texts(&self) -> Vec<&str> {
        self.articles.iter().map(|a| a.text.as_str()).collect()
    }
}
