//! Error types for the crawl pipeline and the analysis commands.
//!
//! Only two failure modes are recovered locally:
//! - transport failures, retried once by the [`Fetcher`](crate::fetcher::Fetcher)
//! - article pages without a body, re-queued by the pipeline
//!
//! Everything else in [`CrawlError`] is fatal and surfaces to `main`.

use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::fetcher::Transport).
pub type TransportFailure = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// The request failed twice in a row, once before and once after the cooldown.
    #[error("request to {url} failed after retry: {source}")]
    Transport {
        url: String,
        source: TransportFailure,
    },

    /// An article page had a body but lacked one of the header fields.
    #[error("article {url} is missing the {field} element")]
    MissingField { url: String, field: &'static str },

    #[error("article {url} has an unparseable timestamp {value:?}")]
    InvalidTimestamp { url: String, value: String },

    #[error("invalid date {value:?}: expected YYYY-MM-DD or YYYY.MM.DD")]
    InvalidDate { value: String },

    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    /// Collection finished without a single article link.
    #[error("no article urls collected for {keyword:?} between {start} and {end}")]
    EmptyUrlSet {
        keyword: String,
        start: String,
        end: String,
    },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_message_mentions_url() {
        let err = CrawlError::Transport {
            url: "https://example.com".to_string(),
            source: Box::new(std::io::Error::other("connection reset")),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_missing_field_message() {
        let err = CrawlError::MissingField {
            url: "https://n.news.naver.com/article/001/1".to_string(),
            field: "title",
        };
        assert_eq!(
            err.to_string(),
            "article https://n.news.naver.com/article/001/1 is missing the title element"
        );
    }
}
