//! Keyword extraction from Korean article text.
//!
//! Noun extraction is delegated to a [`NounTagger`]. The bundled
//! [`HangulNounTagger`] is a lightweight heuristic: it splits text into
//! Hangul/alphanumeric runs, drops tokens that read as inflected predicates
//! or function words, and strips a trailing particle (josa) from the rest.
//! A full morphological analyzer can be plugged in by implementing the trait.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Produces the nouns found in a text, in order of appearance.
pub trait NounTagger {
    fn nouns(&self, text: &str) -> Vec<String>;
}

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣A-Za-z0-9]+").expect("static regex must compile"));

/// Particles stripped from the end of a token, longest first.
const PARTICLES: &[&str] = &[
    "에서는", "으로는", "에게서", "으로써", "이라는", "에서", "에게", "으로", "까지", "부터",
    "처럼", "보다", "이나", "라는", "와의", "과의", "은", "는", "이", "가", "을", "를", "의",
    "에", "와", "과", "도", "로", "만",
];

/// Copula endings; what precedes them is a noun.
const COPULAS: &[&str] = &["이었다", "입니다", "이라고", "이다", "였다"];

/// Conjunctions and adverbs that survive every ending rule.
const FUNCTION_WORDS: &[&str] = &[
    "그리고", "그러나", "하지만", "그런데", "그래서", "따라서", "또한", "또는", "통해", "위해",
    "대해", "의해", "매우", "가장", "다시", "이미", "함께", "모두", "특히", "직접", "아직",
];

/// Sentence-final endings.
const FINAL_ENDINGS: &[char] = &['다', '요', '죠'];

/// Syllables that carry a predicate stem or a tense marker.
const PREDICATE_STEMS: &[char] = &[
    '하', '되', '돼', '있', '없', '않', '받', '했', '됐', '였', '었', '았', '겠',
];

/// Endings that follow a predicate stem syllable.
const STEM_ENDINGS: &[char] = &[
    '는', '은', '을', '고', '게', '며', '면', '던', '지', '여', '어', '서', '도',
];

/// Adnominal and adverbial endings, checked on tokens of three or more syllables.
const MODIFIER_ENDINGS: &[char] = &['게', '운', '한', '된', '할', '될', '던', '며'];

/// Two-syllable connective endings, checked on tokens of three or more syllables.
const CONNECTIVE_ENDINGS: &[&str] = &[
    "해서", "해야", "해도", "하여", "하지", "려고", "도록", "면서", "지만",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HangulNounTagger;

impl HangulNounTagger {
    fn strip_particle(token: &str) -> &str {
        for particle in PARTICLES {
            if let Some(stem) = token.strip_suffix(particle) {
                // A one-syllable stem is more likely a noun ending in the
                // particle's syllable ("국가") than noun + particle.
                if stem.chars().count() >= 2 {
                    return stem;
                }
            }
        }
        token
    }

    fn strip_copula(token: &str) -> Option<&str> {
        COPULAS
            .iter()
            .filter_map(|copula| token.strip_suffix(copula))
            .find(|stem| stem.chars().count() >= 2)
    }

    /// Whether `token` reads as a verb, adjective or adverb form.
    fn is_predicate(token: &str) -> bool {
        if FUNCTION_WORDS.contains(&token) {
            return true;
        }
        let syllables: Vec<char> = token.chars().collect();
        let len = syllables.len();
        if len < 2 {
            return false;
        }
        let last = syllables[len - 1];
        let before_last = syllables[len - 2];
        FINAL_ENDINGS.contains(&last)
            || (STEM_ENDINGS.contains(&last) && PREDICATE_STEMS.contains(&before_last))
            || (len >= 3
                && (MODIFIER_ENDINGS.contains(&last)
                    || CONNECTIVE_ENDINGS.iter().any(|ending| token.ends_with(ending))))
    }

    fn noun(token: &str) -> Option<&str> {
        if token.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if let Some(stem) = Self::strip_copula(token) {
            return Some(stem);
        }
        if Self::is_predicate(token) {
            return None;
        }
        Some(Self::strip_particle(token))
    }
}

impl NounTagger for HangulNounTagger {
    fn nouns(&self, text: &str) -> Vec<String> {
        TOKEN
            .find_iter(text)
            .filter_map(|m| Self::noun(m.as_str()))
            .map(String::from)
            .collect()
    }
}

/// Turns article text into a space-separated keyword string.
#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor<T> {
    tagger: T,
}

impl<T: NounTagger> KeywordExtractor<T> {
    pub fn new(tagger: T) -> Self {
        Self { tagger }
    }

    /// Nouns longer than one character, joined by single spaces.
    pub fn extract_keyword(&self, text: &str) -> String {
        self.tagger
            .nouns(text)
            .into_iter()
            .filter(|noun| noun.chars().count() > 1)
            .join(" ")
    }

    /// [`extract_keyword`](Self::extract_keyword) split back into tokens.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.extract_keyword(text)
            .split_whitespace()
            .map(String::from)
            .collect()
    }
}

/// The `k` most common tokens with their counts.
///
/// Ties keep the order in which tokens were first seen.
pub fn top_counts<'a, I>(tokens: I, k: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }
    order
        .into_iter()
        .map(|token| (token.to_string(), counts[token]))
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(k)
        .collect()
}
