//! TF-IDF vectorizer with an explicit fit step
//!
//! [`TfidfVectorizer::fit`] learns a vocabulary and idf weights from a known
//! corpus and returns an immutable [`TfidfModel`]. The model is persisted with
//! the knowledge index so questions are embedded in the same space as the
//! chunks they are compared against.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

/// Runs of two or more Unicode word characters
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Lowercase and split text into vocabulary tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Learns a [`TfidfModel`] from a corpus
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl TfidfVectorizer {
    /// Keep at most `max_features` terms, ranked by corpus frequency
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    /// Fit vocabulary and idf weights over `corpus`
    pub fn fit<S: AsRef<str>>(&self, corpus: &[S]) -> Result<TfidfModel> {
        let mut term_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u64> = HashMap::new();

        for doc in corpus {
            let mut seen = HashSet::new();
            for token in tokenize(doc.as_ref()) {
                *term_counts.entry(token.clone()).or_default() += 1;
                if seen.insert(token.clone()) {
                    *doc_freq.entry(token).or_default() += 1;
                }
            }
        }

        if term_counts.is_empty() {
            return Err(Error::embedding(
                "empty vocabulary; the corpus contains no indexable terms",
            ));
        }

        // Highest corpus frequency first, ties alphabetical
        let mut ranked: Vec<(&String, &u64)> = term_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.clone()).collect();
        terms.sort();

        let n_docs = corpus.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                (((1.0 + n_docs) / (1.0 + df)).ln() + 1.0) as f32
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        tracing::info!(
            documents = corpus.len(),
            terms = term_counts.len(),
            max_features = self.max_features,
            "Fitted TF-IDF vocabulary"
        );

        Ok(TfidfModel {
            vocabulary,
            idf,
            max_features: self.max_features,
        })
    }
}

/// Immutable fitted TF-IDF model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfModel {
    /// Term → column, columns in alphabetical term order
    vocabulary: BTreeMap<String, usize>,
    /// Smoothed idf weight per column
    idf: Vec<f32>,
    /// Vocabulary limit the model was fitted with
    max_features: usize,
}

impl TfidfModel {
    /// Number of learned terms (at most `max_features`)
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Column of a term, if it is in the vocabulary
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// L2-normalised tf-idf row of length `vocabulary_len()`
    ///
    /// Text without known terms maps to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut row = vec![0.0f32; self.idf.len()];
        for token in tokenize(text) {
            if let Some(&col) = self.vocabulary.get(&token) {
                row[col] += 1.0;
            }
        }

        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut row {
                *value /= norm;
            }
        }
        row
    }

    /// Check internal consistency after deserialisation
    pub fn is_consistent(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self.vocabulary.values().all(|&col| col < self.idf.len())
    }
}

/// Embedding provider backed by a fitted [`TfidfModel`]
pub struct TfidfEmbedder {
    model: Arc<TfidfModel>,
}

impl TfidfEmbedder {
    pub fn new(model: Arc<TfidfModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<TfidfModel> {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for TfidfEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.transform(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.model.transform(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.model.max_features
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}
