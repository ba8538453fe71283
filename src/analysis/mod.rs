//! Text analysis over crawled articles.
//!
//! - [`keywords`]: noun extraction and token counts
//! - [`tfidf`]: TF-IDF scoring of chosen terms across articles
//! - [`topics`]: LDA topic modeling with coherence and perplexity
//!
//! All three work on plain strings, so they can be fed from any
//! [`ArticleCollection`](crate::models::ArticleCollection) on disk.

pub mod keywords;
pub mod tfidf;
pub mod topics;
