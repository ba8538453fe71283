//! # Naver News Topics
//!
//! Crawls Korean news articles found through the Naver News search portal
//! and analyzes them.
//!
//! ## Usage
//!
//! ```sh
//! naver_news_topics crawl -k 마이데이터 -s 2023-07-01 -e 2023-07-30 -o ./data
//! naver_news_topics keywords -i ./data/마이데이터_articles_2023-07-01_2023-07-30.json
//! naver_news_topics tfidf -i ./data/마이데이터_articles_2023-07-01_2023-07-30.json -t 금융,보안
//! naver_news_topics topics -i ./data/마이데이터_articles_2023-07-01_2023-07-30.json -r topics.json
//! ```
//!
//! ## Architecture
//!
//! A crawl runs strictly one request at a time:
//! 1. **Collection**: walk the search listing of every day in the range and
//!    gather article links
//! 2. **Sidecar**: write the link list next to the output
//! 3. **Extraction**: fetch each article, retrying pages without a body a
//!    bounded number of times
//! 4. **Output**: write the article collection as JSON
//!
//! The analysis subcommands read that JSON back.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod cli;
mod collector;
mod config;
mod error;
mod extractor;
mod fetcher;
mod models;
mod outputs;
mod pacing;
mod pipeline;
mod scrapers;
mod utils;

use analysis::keywords::{HangulNounTagger, KeywordExtractor, top_counts};
use analysis::tfidf::tf_idf;
use analysis::topics::TopicModeling;
use cli::{Cli, Command, CrawlArgs, KeywordsArgs, TfidfArgs, TopicsArgs};
use config::CrawlerConfig;
use models::{ArticleCollection, DateRange};
use outputs::json::{read_collection, write_collection, write_json};
use pipeline::NewsCrawler;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Crawl(args) => crawl(args).await?,
        Command::Keywords(args) => keywords(args).await?,
        Command::Tfidf(args) => tfidf(args).await?,
        Command::Topics(args) => topics(args).await?,
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(keyword = %args.keyword))]
async fn crawl(args: CrawlArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => CrawlerConfig::load(path)?,
        None => CrawlerConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    let range = DateRange::parse(&args.start, &args.end)?;

    // Fail before the crawl, not after hours of fetching.
    ensure_writable_dir(&config.output_dir).await?;

    let crawler = NewsCrawler::from_config(&config)?;
    let collection = crawler.run(&args.keyword, range).await?;
    if collection.is_empty() {
        warn!(failed = collection.failed.len(), "No article yielded a body");
    }
    let path = write_collection(&collection, crawler.output_dir()).await?;
    info!(
        path = %path.display(),
        articles = collection.len(),
        failed = collection.failed.len(),
        "Crawl saved"
    );
    Ok(())
}

/// Keyword tokens of every article, in collection order.
fn article_tokens(collection: &ArticleCollection) -> Vec<Vec<String>> {
    let extractor = KeywordExtractor::new(HangulNounTagger);
    collection
        .texts()
        .into_iter()
        .map(|text| extractor.tokens(text))
        .collect()
}

async fn keywords(args: KeywordsArgs) -> Result<(), Box<dyn Error>> {
    let collection = read_collection(&args.input).await?;
    let tokens = article_tokens(&collection);
    let counts = top_counts(tokens.iter().flatten().map(String::as_str), args.top);
    for (keyword, count) in counts {
        println!("{keyword}\t{count}");
    }
    Ok(())
}

async fn tfidf(args: TfidfArgs) -> Result<(), Box<dyn Error>> {
    let collection = read_collection(&args.input).await?;
    let tokens = article_tokens(&collection);
    let docs: Vec<String> = tokens.iter().map(|t| t.join(" ")).collect();

    let terms = if args.terms.is_empty() {
        top_counts(tokens.iter().flatten().map(String::as_str), args.top)
            .into_iter()
            .map(|(term, _)| term)
            .collect()
    } else {
        args.terms
    };
    info!(terms = terms.len(), docs = docs.len(), "Scoring TF-IDF");

    let table = tf_idf(&terms, &docs);
    match args.output {
        Some(path) => write_json(&table, &path).await?,
        None => print!("{}", table.to_tsv()),
    }
    Ok(())
}

async fn topics(args: TopicsArgs) -> Result<(), Box<dyn Error>> {
    let collection = read_collection(&args.input).await?;
    if collection.is_empty() {
        warn!(path = %args.input.display(), "Collection has no articles; topics will be empty");
    }
    let texts = article_tokens(&collection);
    let modeling = TopicModeling::new(&texts);
    let model = modeling.train_lda(args.num_topics, args.passes, args.seed);

    for (id, description) in modeling.get_topics(&model, args.num_words) {
        println!("{id}\t{description}");
    }

    let report = modeling.visualize(&model, args.num_words);
    info!(
        coherence = report.coherence,
        log_perplexity = report.log_perplexity,
        "Topic model quality"
    );
    if let Some(path) = args.report {
        write_json(&report, &path).await?;
    }
    Ok(())
}
