//! Sparse term-weight vectors
//!
//! Context segments are represented as sparse vectors over the corpus
//! vocabulary. Entries are kept sorted by term id so that dot products
//! are a single merge pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sparse vector of `(term_id, weight)` pairs, sorted by term id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f64)>,
}

impl SparseVector {
    /// Build a vector from arbitrary entries.
    ///
    /// Duplicate term ids are summed; zero and non-finite weights are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let mut merged: BTreeMap<u32, f64> = BTreeMap::new();
        for (term, weight) in entries {
            *merged.entry(term).or_insert(0.0) += weight;
        }

        Self {
            entries: merged
                .into_iter()
                .filter(|(_, w)| w.is_finite() && *w != 0.0)
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight of a term (0 when absent)
    pub fn get(&self, term: u32) -> f64 {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Dot product with another sparse vector
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Cosine similarity.
    ///
    /// Returns 0 when either vector has zero norm. The result is clamped to
    /// `[-1, 1]` to absorb floating point error; for non-negative weights it
    /// lies in `[0, 1]`.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0)
    }

    /// Scale to unit length (no-op for the zero vector)
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    /// Element-wise mean of a set of vectors.
    ///
    /// Returns `None` when no vectors are given.
    pub fn mean_of<'a>(vectors: impl IntoIterator<Item = &'a SparseVector>) -> Option<Self> {
        let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
        let mut count = 0usize;

        for vector in vectors {
            count += 1;
            for &(term, weight) in &vector.entries {
                *sums.entry(term).or_insert(0.0) += weight;
            }
        }

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Self::from_entries(sums.into_iter().map(|(t, w)| (t, w / n))))
    }
}

// ============================================================================
// Tests
// ============================================================================
