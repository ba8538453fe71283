//! Crawler configuration.
//!
//! Every field has a default, so a YAML file only needs the keys it wants to
//! override:
//!
//! ```yaml
//! page_delay_secs: 5
//! max_attempts: 3
//! output_dir: ./data
//! ```

use crate::error::CrawlError;
use crate::pacing::PacingPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/39.0.2171.95 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Sent as the `User-Agent` header on every request.
    pub user_agent: String,
    /// Wait before the single retry after a transport failure.
    pub transport_cooldown_secs: u64,
    pub page_delay_secs: u64,
    pub day_delay_secs: u64,
    pub article_delay_secs: u64,
    /// Highest search page index scanned per day (inclusive).
    pub last_page: u32,
    /// Empty-body responses tolerated per article before it is given up on.
    pub max_attempts: u32,
    /// Where the URL sidecar and the article JSON are written.
    pub output_dir: PathBuf,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            transport_cooldown_secs: 300,
            page_delay_secs: 10,
            day_delay_secs: 10,
            article_delay_secs: 10,
            last_page: 400,
            max_attempts: 5,
            output_dir: PathBuf::from("."),
        }
    }
}

impl CrawlerConfig {
    /// Load a YAML config file; missing keys fall back to defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(?config, "Loaded crawler configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, CrawlError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(raw)?;
        config.max_attempts = config.max_attempts.max(1);
        Ok(config)
    }

    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy {
            transport_cooldown: Duration::from_secs(self.transport_cooldown_secs),
            page_delay: Duration::from_secs(self.page_delay_secs),
            day_delay: Duration::from_secs(self.day_delay_secs),
            article_delay: Duration::from_secs(self.article_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_crawl_policy() {
        let config = CrawlerConfig::default();
        assert_eq!(config.transport_cooldown_secs, 300);
        assert_eq!(config.page_delay_secs, 10);
        assert_eq!(config.day_delay_secs, 10);
        assert_eq!(config.article_delay_secs, 10);
        assert_eq!(config.last_page, 400);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CrawlerConfig::from_yaml("page_delay_secs: 2\noutput_dir: /tmp/out\n").unwrap();
        assert_eq!(config.page_delay_secs, 2);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.day_delay_secs, 10);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_zero_attempts_is_raised_to_one() {
        let config = CrawlerConfig::from_yaml("max_attempts: 0").unwrap();
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(CrawlerConfig::from_yaml("").unwrap(), CrawlerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "transport_cooldown_secs: 1\nlast_page: 3").unwrap();
        let config = CrawlerConfig::load(file.path()).unwrap();
        assert_eq!(config.transport_cooldown_secs, 1);
        assert_eq!(config.last_page, 3);
        assert_eq!(config.pacing().transport_cooldown, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = CrawlerConfig::from_yaml("last_page: [not, a, number]").unwrap_err();
        assert!(matches!(err, CrawlError::Yaml(_)));
    }
}
