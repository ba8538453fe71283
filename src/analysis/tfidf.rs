//! TF-IDF scoring over raw document strings.
//!
//! Term frequency is the number of non-overlapping occurrences of the term
//! in the document string, so a term also matches inside longer words.
//! Inverse document frequency is `ln(N / (df + 1))`, which goes negative
//! for terms present in every document.

use serde::Serialize;
use std::fmt::Write;

/// Occurrences of `term` in `doc`.
pub fn tf(term: &str, doc: &str) -> usize {
    doc.matches(term).count()
}

/// `ln(N / (df + 1))` where `df` counts the documents containing `term`.
pub fn idf<S: AsRef<str>>(term: &str, docs: &[S]) -> f64 {
    let df = docs.iter().filter(|doc| doc.as_ref().contains(term)).count();
    (docs.len() as f64 / (df + 1) as f64).ln()
}

/// Document-by-term score table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TfIdfTable {
    pub terms: Vec<String>,
    /// One row per document, one column per term.
    pub rows: Vec<Vec<f64>>,
}

impl TfIdfTable {
    #[cfg(test)]
    pub fn score(&self, doc: usize, term: &str) -> Option<f64> {
        let column = self.terms.iter().position(|t| t == term)?;
        self.rows.get(doc).map(|row| row[column])
    }

    /// Tab-separated rendering with a header row and a leading document index.
    pub fn to_tsv(&self) -> String {
        let mut out = String::from("doc");
        for term in &self.terms {
            out.push('\t');
            out.push_str(term);
        }
        out.push('\n');
        for (i, row) in self.rows.iter().enumerate() {
            let _ = write!(out, "{i}");
            for value in row {
                let _ = write!(out, "\t{value:.6}");
            }
            out.push('\n');
        }
        out
    }
}

/// Score every `term` in every document of `docs`.
pub fn tf_idf<T, D>(terms: &[T], docs: &[D]) -> TfIdfTable
where
    T: AsRef<str>,
    D: AsRef<str>,
{
    let idfs: Vec<f64> = terms.iter().map(|t| idf(t.as_ref(), docs)).collect();
    let rows = docs
        .iter()
        .map(|doc| {
            terms
                .iter()
                .zip(&idfs)
                .map(|(term, idf)| tf(term.as_ref(), doc.as_ref()) as f64 * idf)
                .collect()
        })
        .collect();
    TfIdfTable {
        terms: terms.iter().map(|t| t.as_ref().to_string()).collect(),
        rows,
    }
}
