//! Command-line interface definitions.
//!
//! `crawl` talks to the network; the other subcommands read the article JSON
//! a crawl leaves behind.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// # Examples
///
/// ```sh
/// # Crawl a week of articles, then model their topics
/// naver_news_topics crawl -k 마이데이터 -s 2023-07-01 -e 2023-07-07 -o ./data
/// naver_news_topics topics -i ./data/마이데이터_articles_2023-07-01_2023-07-07.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect article URLs from search results and extract every article
    Crawl(CrawlArgs),
    /// Print the most common keywords across a crawled collection
    Keywords(KeywordsArgs),
    /// Score terms by TF-IDF across a crawled collection
    Tfidf(TfidfArgs),
    /// Train an LDA topic model on a crawled collection
    Topics(TopicsArgs),
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Search keyword
    #[arg(short, long)]
    pub keyword: String,

    /// First day to search (YYYY-MM-DD or YYYY.MM.DD)
    #[arg(short, long)]
    pub start: String,

    /// Last day to search, inclusive
    #[arg(short, long)]
    pub end: String,

    /// Optional path to a YAML crawler config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory; overrides the config file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct KeywordsArgs {
    /// Article collection JSON written by `crawl`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of keywords to print
    #[arg(short = 'n', long, default_value_t = 100)]
    pub top: usize,
}

#[derive(Args, Debug)]
pub struct TfidfArgs {
    /// Article collection JSON written by `crawl`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Terms to score; defaults to the most common keywords
    #[arg(short, long, value_delimiter = ',')]
    pub terms: Vec<String>,

    /// How many common keywords to score when no terms are given
    #[arg(short = 'n', long, default_value_t = 20)]
    pub top: usize,

    /// Write the table as JSON instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TopicsArgs {
    /// Article collection JSON written by `crawl`
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(long, default_value_t = 10)]
    pub num_topics: usize,

    #[arg(long, default_value_t = 15)]
    pub passes: usize,

    /// Words shown per topic
    #[arg(long, default_value_t = 5)]
    pub num_words: usize,

    /// Random seed for the sampler
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Write a JSON topic report to this path
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}
