//! LDA topic modeling over tokenized documents.
//!
//! [`TopicModeling`] owns the [`Dictionary`] and bag-of-words corpus built
//! from the input texts and trains [`LdaModel`]s over them. Training uses
//! collapsed Gibbs sampling with symmetric priors `alpha = eta = 1/K`; each
//! pass is one sweep over every token of the corpus. A fixed seed makes runs
//! reproducible.

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// `(token id, count)` pairs sorted by id.
pub type BowDocument = Vec<(usize, usize)>;

/// Token to id mapping with document frequencies.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    token2id: HashMap<String, usize>,
    id2token: Vec<String>,
    dfs: Vec<usize>,
}

impl Dictionary {
    /// Assign ids in order of first appearance.
    pub fn new<S: AsRef<str>>(texts: &[Vec<S>]) -> Self {
        let mut dict = Self::default();
        for text in texts {
            let mut seen = HashSet::new();
            for token in text {
                let token = token.as_ref();
                let id = match dict.token2id.get(token) {
                    Some(&id) => id,
                    None => {
                        let id = dict.id2token.len();
                        dict.token2id.insert(token.to_string(), id);
                        dict.id2token.push(token.to_string());
                        dict.dfs.push(0);
                        id
                    }
                };
                if seen.insert(id) {
                    dict.dfs[id] += 1;
                }
            }
        }
        dict
    }

    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.token2id.get(token).copied()
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.id2token.get(id).map(String::as_str)
    }

    /// Number of documents the token appeared in.
    pub fn doc_freq(&self, id: usize) -> usize {
        self.dfs.get(id).copied().unwrap_or(0)
    }

    /// Count known tokens of `doc`; unknown tokens are ignored.
    pub fn doc2bow<S: AsRef<str>>(&self, doc: &[S]) -> BowDocument {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in doc {
            if let Some(id) = self.id(token.as_ref()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().sorted().collect()
    }
}

/// A trained topic model.
#[derive(Debug, Clone)]
pub struct LdaModel {
    num_topics: usize,
    alpha: f64,
    seed: u64,
    /// Topic-word distributions, `num_topics` rows of vocabulary size.
    phi: Vec<Vec<f64>>,
    /// Topic mixture of every training document.
    theta: Vec<Vec<f64>>,
}

/// Sample an index proportionally to `weights`.
fn sample(weights: &[f64], rng: &mut StdRng) -> usize {
    let total: f64 = weights.iter().sum();
    let mut r = rng.random::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        if r < *w {
            return i;
        }
        r -= w;
    }
    weights.len() - 1
}

fn expand(bow: &BowDocument) -> Vec<usize> {
    bow.iter()
        .flat_map(|&(id, count)| std::iter::repeat_n(id, count))
        .collect()
}

impl LdaModel {
    /// Train on `corpus` with `vocab_size` distinct tokens.
    #[instrument(level = "info", skip(corpus), fields(docs = corpus.len()))]
    pub fn train(
        corpus: &[BowDocument],
        vocab_size: usize,
        num_topics: usize,
        passes: usize,
        seed: u64,
    ) -> Self {
        let k = num_topics.max(1);
        let v = vocab_size.max(1);
        let alpha = 1.0 / k as f64;
        let eta = 1.0 / k as f64;
        let mut rng = StdRng::seed_from_u64(seed);

        let docs: Vec<Vec<usize>> = corpus.iter().map(expand).collect();
        let mut topic_word = vec![vec![0usize; v]; k];
        let mut topic_total = vec![0usize; k];
        let mut doc_topic = vec![vec![0usize; k]; docs.len()];
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(docs.len());

        for (d, doc) in docs.iter().enumerate() {
            let mut z = Vec::with_capacity(doc.len());
            for &w in doc {
                let t = rng.random_range(0..k);
                topic_word[t][w] += 1;
                topic_total[t] += 1;
                doc_topic[d][t] += 1;
                z.push(t);
            }
            assignments.push(z);
        }

        let v_eta = v as f64 * eta;
        let mut weights = vec![0.0; k];
        for pass in 0..passes {
            for (d, doc) in docs.iter().enumerate() {
                for (i, &w) in doc.iter().enumerate() {
                    let old = assignments[d][i];
                    topic_word[old][w] -= 1;
                    topic_total[old] -= 1;
                    doc_topic[d][old] -= 1;

                    for (t, weight) in weights.iter_mut().enumerate() {
                        *weight = (doc_topic[d][t] as f64 + alpha)
                            * (topic_word[t][w] as f64 + eta)
                            / (topic_total[t] as f64 + v_eta);
                    }
                    let new = sample(&weights, &mut rng);

                    topic_word[new][w] += 1;
                    topic_total[new] += 1;
                    doc_topic[d][new] += 1;
                    assignments[d][i] = new;
                }
            }
            debug!(pass, "Finished Gibbs sweep");
        }

        let phi = topic_word
            .iter()
            .zip(&topic_total)
            .map(|(row, &total)| {
                row.iter()
                    .map(|&n| (n as f64 + eta) / (total as f64 + v_eta))
                    .collect()
            })
            .collect();
        let theta = doc_topic
            .iter()
            .zip(&docs)
            .map(|(row, doc)| {
                let denom = doc.len() as f64 + k as f64 * alpha;
                row.iter().map(|&n| (n as f64 + alpha) / denom).collect()
            })
            .collect();

        info!(num_topics = k, vocab_size = v, passes, "Trained LDA model");
        Self {
            num_topics: k,
            alpha,
            seed,
            phi,
            theta,
        }
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Word distribution of `topic`.
    #[cfg(test)]
    pub fn topic_terms(&self, topic: usize) -> &[f64] {
        &self.phi[topic]
    }

    /// Topic mixtures of the training documents.
    pub fn document_topics(&self) -> &[Vec<f64>] {
        &self.theta
    }

    /// The `n` most probable token ids of `topic`, highest first.
    pub fn top_words(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        self.phi[topic]
            .iter()
            .copied()
            .enumerate()
            .sorted_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }

    /// Estimate the topic mixture of an unseen document with `phi` held fixed.
    pub fn infer(&self, bow: &BowDocument, iterations: usize, rng: &mut StdRng) -> Vec<f64> {
        let k = self.num_topics;
        let words: Vec<usize> = expand(bow)
            .into_iter()
            .filter(|&w| w < self.phi[0].len())
            .collect();
        let mut counts = vec![0usize; k];
        let mut z: Vec<usize> = words
            .iter()
            .map(|_| {
                let t = rng.random_range(0..k);
                counts[t] += 1;
                t
            })
            .collect();

        let mut weights = vec![0.0; k];
        for _ in 0..iterations {
            for (i, &w) in words.iter().enumerate() {
                counts[z[i]] -= 1;
                for (t, weight) in weights.iter_mut().enumerate() {
                    *weight = (counts[t] as f64 + self.alpha) * self.phi[t][w];
                }
                z[i] = sample(&weights, rng);
                counts[z[i]] += 1;
            }
        }

        let denom = words.len() as f64 + k as f64 * self.alpha;
        counts
            .iter()
            .map(|&n| (n as f64 + self.alpha) / denom)
            .collect()
    }

    /// Per-word log-likelihood bound of `corpus`; higher is better.
    pub fn log_perplexity(&self, corpus: &[BowDocument]) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let vocab = self.phi.first().map_or(0, Vec::len);
        let mut log_likelihood = 0.0;
        let mut words = 0usize;
        for bow in corpus {
            let theta = self.infer(bow, 20, &mut rng);
            for &(w, count) in bow.iter().filter(|(w, _)| *w < vocab) {
                let p: f64 = (0..self.num_topics).map(|t| theta[t] * self.phi[t][w]).sum();
                log_likelihood += count as f64 * p.ln();
                words += count;
            }
        }
        if words == 0 {
            0.0
        } else {
            log_likelihood / words as f64
        }
    }
}

const CV_TOP_WORDS: usize = 20;
const CV_WINDOW: usize = 110;
const NPMI_EPSILON: f64 = 1e-12;

/// Occurrence and co-occurrence counts over boolean sliding windows.
#[derive(Debug, Default)]
struct WindowCounts {
    windows: usize,
    single: HashMap<usize, usize>,
    joint: HashMap<(usize, usize), usize>,
}

impl WindowCounts {
    /// A text shorter than `window` counts as a single window.
    fn collect(texts: &[Vec<usize>], relevant: &HashSet<usize>, window: usize) -> Self {
        let window = window.max(1);
        let mut counts = Self::default();
        for text in texts.iter().filter(|t| !t.is_empty()) {
            let positions = text.len().saturating_sub(window) + 1;
            for start in 0..positions {
                let end = (start + window).min(text.len());
                let present: Vec<usize> = text[start..end]
                    .iter()
                    .copied()
                    .filter(|id| relevant.contains(id))
                    .sorted()
                    .dedup()
                    .collect();
                counts.windows += 1;
                for (i, &a) in present.iter().enumerate() {
                    *counts.single.entry(a).or_insert(0) += 1;
                    for &b in &present[i + 1..] {
                        *counts.joint.entry((a, b)).or_insert(0) += 1;
                    }
                }
            }
        }
        counts
    }

    fn probability(&self, count: usize) -> f64 {
        count as f64 / self.windows as f64
    }

    /// Normalized pointwise mutual information of two words.
    fn npmi(&self, a: usize, b: usize) -> f64 {
        let p_a = self.probability(self.single.get(&a).copied().unwrap_or(0));
        let p_b = self.probability(self.single.get(&b).copied().unwrap_or(0));
        if p_a == 0.0 || p_b == 0.0 {
            return 0.0;
        }
        let together = if a == b {
            self.single.get(&a).copied().unwrap_or(0)
        } else {
            self.joint.get(&(a.min(b), a.max(b))).copied().unwrap_or(0)
        };
        let p_ab = self.probability(together) + NPMI_EPSILON;
        (p_ab / (p_a * p_b)).ln() / -p_ab.ln()
    }

    /// One-set segmentation with indirect cosine confirmation.
    fn topic_cv(&self, top: &[usize]) -> f64 {
        if top.is_empty() {
            return 0.0;
        }
        let vectors: Vec<Vec<f64>> = top
            .iter()
            .map(|&w| top.iter().map(|&other| self.npmi(w, other)).collect())
            .collect();
        let set: Vec<f64> = (0..top.len())
            .map(|j| vectors.iter().map(|v| v[j]).sum())
            .collect();
        let total: f64 = vectors.iter().map(|v| cosine(v, &set)).sum();
        total / top.len() as f64
    }
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// A single term and its weight within a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
    /// Training documents containing the term.
    pub documents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub id: usize,
    /// Mean share of the topic across training documents.
    pub prevalence: f64,
    pub terms: Vec<TermWeight>,
}

/// Serializable view of a trained model for inspection outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicReport {
    pub num_topics: usize,
    pub num_documents: usize,
    pub vocabulary_size: usize,
    pub coherence: f64,
    pub log_perplexity: f64,
    pub topics: Vec<TopicSummary>,
}

/// Dictionary and corpus built from tokenized texts.
#[derive(Debug, Clone)]
pub struct TopicModeling {
    dictionary: Dictionary,
    corpus: Vec<BowDocument>,
    /// The texts as token ids, in their original order, for coherence windows.
    texts: Vec<Vec<usize>>,
}

impl TopicModeling {
    pub fn new(texts: &[Vec<String>]) -> Self {
        let dictionary = Dictionary::new(texts);
        let corpus = texts.iter().map(|t| dictionary.doc2bow(t)).collect();
        let texts = texts
            .iter()
            .map(|t| t.iter().filter_map(|token| dictionary.id(token)).collect())
            .collect();
        Self {
            dictionary,
            corpus,
            texts,
        }
    }

    pub fn train_lda(&self, num_topics: usize, passes: usize, seed: u64) -> LdaModel {
        LdaModel::train(&self.corpus, self.dictionary.len(), num_topics, passes, seed)
    }

    /// Topics as `(id, "0.123*\"term\" + ...")`.
    pub fn get_topics(&self, model: &LdaModel, num_words: usize) -> Vec<(usize, String)> {
        (0..model.num_topics())
            .map(|topic| {
                let description = model
                    .top_words(topic, num_words)
                    .into_iter()
                    .map(|(id, p)| format!("{:.3}*\"{}\"", p, self.dictionary.token(id).unwrap_or("")))
                    .join(" + ");
                (topic, description)
            })
            .collect()
    }

    /// `c_v` coherence averaged over topics, using the top 20 words of each.
    ///
    /// Word probabilities come from boolean sliding windows of 110 tokens
    /// over the training texts. Each top word's NPMI vector is compared by
    /// cosine similarity with the summed vector of the whole top-word set.
    /// Scores fall in `[-1, 1]`; higher is better.
    pub fn compute_coherence(&self, model: &LdaModel) -> f64 {
        self.cv_coherence(model, CV_TOP_WORDS, CV_WINDOW)
    }

    fn cv_coherence(&self, model: &LdaModel, top_n: usize, window: usize) -> f64 {
        if model.num_topics() == 0 || self.dictionary.is_empty() {
            return 0.0;
        }
        let tops: Vec<Vec<usize>> = (0..model.num_topics())
            .map(|topic| {
                model
                    .top_words(topic, top_n)
                    .into_iter()
                    .map(|(id, _)| id)
                    .collect()
            })
            .collect();
        let relevant: HashSet<usize> = tops.iter().flatten().copied().collect();
        let counts = WindowCounts::collect(&self.texts, &relevant, window);
        if counts.windows == 0 {
            return 0.0;
        }

        let total: f64 = tops.iter().map(|top| counts.topic_cv(top)).sum();
        total / tops.len() as f64
    }

    pub fn compute_perplexity(&self, model: &LdaModel) -> f64 {
        model.log_perplexity(&self.corpus)
    }

    /// Summarize `model` for export.
    pub fn visualize(&self, model: &LdaModel, num_words: usize) -> TopicReport {
        let docs = model.document_topics();
        let topics = (0..model.num_topics())
            .map(|topic| {
                let prevalence = if docs.is_empty() {
                    0.0
                } else {
                    docs.iter().map(|theta| theta[topic]).sum::<f64>() / docs.len() as f64
                };
                let terms = model
                    .top_words(topic, num_words)
                    .into_iter()
                    .map(|(id, weight)| TermWeight {
                        term: self.dictionary.token(id).unwrap_or_default().to_string(),
                        weight,
                        documents: self.dictionary.doc_freq(id),
                    })
                    .collect();
                TopicSummary {
                    id: topic,
                    prevalence,
                    terms,
                }
            })
            .collect();

        TopicReport {
            num_topics: model.num_topics(),
            num_documents: self.corpus.len(),
            vocabulary_size: self.dictionary.len(),
            coherence: self.compute_coherence(model),
            log_perplexity: self.compute_perplexity(model),
            topics,
        }
    }
}
