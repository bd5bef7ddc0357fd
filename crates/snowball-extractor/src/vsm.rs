//! TF-IDF vector-space model
//!
//! Each corpus sentence is one document. A term's weight in a segment is
//! `tf * log2(N / df)`, and segment vectors are L2-normalised. Terms that
//! occur in every document carry no weight and are dropped.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::Vectorizer;
use snowball_core::SparseVector;

/// TF-IDF model fitted on a corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfIdfModel {
    /// Term -> term id
    vocabulary: HashMap<String, u32>,
    /// Document frequency per term id
    document_frequency: Vec<u32>,
    /// Number of documents seen
    num_documents: usize,
}

impl TfIdfModel {
    /// Fit the model on tokenized documents
    pub fn fit<I, D>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[String]>,
    {
        let mut model = Self::default();

        for document in documents {
            model.num_documents += 1;
            let distinct: BTreeSet<&String> = document.as_ref().iter().collect();
            for term in distinct {
                let next_id = model.vocabulary.len() as u32;
                let id = *model.vocabulary.entry(term.clone()).or_insert(next_id);
                if id as usize == model.document_frequency.len() {
                    model.document_frequency.push(0);
                }
                model.document_frequency[id as usize] += 1;
            }
        }

        tracing::debug!(
            documents = model.num_documents,
            terms = model.vocabulary.len(),
            "Fitted tf-idf model"
        );
        model
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    /// Inverse document frequency of a term id
    pub fn idf(&self, term_id: u32) -> f64 {
        match self.document_frequency.get(term_id as usize) {
            Some(&df) if df > 0 => (self.num_documents as f64 / df as f64).log2(),
            _ => 0.0,
        }
    }
}

impl Vectorizer for TfIdfModel {
    fn vectorize(&self, tokens: &[String]) -> Option<SparseVector> {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(id) = self.term_id(token) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let vector = SparseVector::from_entries(
            counts
                .into_iter()
                .map(|(id, tf)| (id, tf * self.idf(id))),
        )
        .normalized();

        if vector.is_empty() {
            None
        } else {
            Some(vector)
        }
    }
}
