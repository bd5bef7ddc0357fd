//! Instance/pattern similarity
//!
//! Weighted sum of the cosine similarities of the before, between and after
//! segments. A segment where either side has no vector contributes 0.

use snowball_core::{BootstrapConfig, Instance, Segment};

use crate::pattern::Pattern;

/// Segment weights for the similarity function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SimilarityScorer {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(config.alpha, config.beta, config.gamma)
    }

    fn weight(&self, segment: Segment) -> f64 {
        match segment {
            Segment::Before => self.alpha,
            Segment::Between => self.beta,
            Segment::After => self.gamma,
        }
    }

    /// Cosine similarity of one segment, 0 when either vector is absent
    pub fn segment_similarity(&self, instance: &Instance, pattern: &Pattern, segment: Segment) -> f64 {
        match (instance.vector(segment), pattern.centroid().get(segment)) {
            (Some(a), Some(b)) => a.cosine(b),
            _ => 0.0,
        }
    }

    /// Similarity of an instance to a pattern's centroid.
    ///
    /// For non-negative term weights the result lies in
    /// `[0, alpha + beta + gamma]`.
    pub fn score(&self, instance: &Instance, pattern: &Pattern) -> f64 {
        Segment::ALL
            .iter()
            .map(|&segment| self.weight(segment) * self.segment_similarity(instance, pattern, segment))
            .sum()
    }
}
