use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayViewMut1};
use serde::{Deserialize, Serialize};

use super::analyzer::analyze;
use super::error::ClassifierError;
use super::utils::normalize_vector;
use crate::config::VectorizerConfig;

/// Term-count vectorizer followed by TF-IDF reweighting.
///
/// The vocabulary and IDF weights are learned once by [`TfidfVectorizer::fit`]
/// and never change afterwards. Terms that were not seen at fit time are
/// ignored by [`TfidfVectorizer::transform`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term to column index, assigned in lexicographic term order
    vocabulary: BTreeMap<String, usize>,
    /// Smoothed inverse document frequency per column
    idf: Array1<f64>,
    config: VectorizerConfig,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and IDF weights from the training documents.
    ///
    /// # Errors
    /// - `EmptyDatasetError` if there are no documents or none of them
    ///   produces a single term
    pub fn fit<S: AsRef<str>>(
        documents: &[S],
        config: &VectorizerConfig,
    ) -> Result<Self, ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::EmptyDatasetError(
                "Cannot fit a vectorizer on zero documents".into(),
            ));
        }

        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| analyze(doc.as_ref(), config))
            .collect();

        let terms: BTreeSet<&str> = analyzed.iter().flatten().map(String::as_str).collect();
        if terms.is_empty() {
            return Err(ClassifierError::EmptyDatasetError(
                "Empty vocabulary: training utterances contain no tokens".into(),
            ));
        }
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in &analyzed {
            let unique: BTreeSet<usize> = doc.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for idx in unique {
                document_frequency[idx] += 1;
            }
        }

        let n_documents = documents.len() as f64;
        let idf = Array1::from_iter(
            document_frequency
                .iter()
                .map(|&df| ((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0),
        );

        info!(
            "Fitted vectorizer on {} documents ({} terms)",
            documents.len(),
            vocabulary.len()
        );

        Ok(Self {
            vocabulary,
            idf,
            config: config.clone(),
        })
    }

    /// Fits the vectorizer and returns it together with the TF-IDF matrix of
    /// the same documents.
    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
        config: &VectorizerConfig,
    ) -> Result<(Self, Array2<f64>), ClassifierError> {
        let vectorizer = Self::fit(documents, config)?;
        let matrix = vectorizer.transform_batch(documents);
        Ok((vectorizer, matrix))
    }

    /// Transforms one document into an L2-normalized TF-IDF vector.
    pub fn transform(&self, document: &str) -> Array1<f64> {
        let mut row = Array1::zeros(self.vocabulary_size());
        self.fill_row(document, row.view_mut());
        row
    }

    /// Transforms documents into a `documents x vocabulary` matrix.
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Array2<f64> {
        let mut matrix = Array2::zeros((documents.len(), self.vocabulary_size()));
        for (doc, row) in documents.iter().zip(matrix.rows_mut()) {
            self.fill_row(doc.as_ref(), row);
        }
        matrix
    }

    fn fill_row(&self, document: &str, mut row: ArrayViewMut1<f64>) {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        let mut ignored = 0usize;
        for term in analyze(document, &self.config) {
            match self.vocabulary.get(&term) {
                Some(&idx) => *counts.entry(idx).or_insert(0.0) += 1.0,
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            debug!("Ignored {} out-of-vocabulary terms", ignored);
        }

        for (idx, count) in counts {
            let tf = if self.config.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            row[idx] = tf * self.idf[idx];
        }

        normalize_vector(&mut row);
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}
