//! Pattern and instance confidence
//!
//! Pattern confidence comes from selectivity: the share of a pattern's
//! extractions whose entity pair is a seed. Instance confidence combines
//! every supporting pattern with a noisy-or, damped against the previous
//! iteration's value after the first iteration.

use snowball_core::{BootstrapConfig, Instance};

use crate::pattern::{Pattern, PatternId, PatternSet};

/// A pattern that extracted an instance, with its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternMatch {
    pub pattern: PatternId,
    pub score: f64,
}

/// Plain selectivity: positive / total
pub fn selectivity(positive: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        positive as f64 / total as f64
    }
}

/// RlogF-style confidence.
///
/// Weights selectivity by `L / (1 + L)` with `L = log2(total)`, which keeps
/// the value in [0, 1) and gives a pattern with a single extraction zero
/// confidence.
pub fn rlogf(positive: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let log_total = (total as f64).log2();
    selectivity(positive, total) * log_total / (1.0 + log_total)
}

/// Noisy-or over `(pattern confidence, similarity score)` pairs:
/// `1 - prod(1 - conf * score)`
///
/// Scores can exceed 1 when `alpha + beta + gamma > 1`; each term
/// `conf * score` is clamped to [0, 1], so a single such match can drive
/// the result to exactly 1.
pub fn noisy_or(evidence: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let miss: f64 = evidence
        .into_iter()
        .map(|(confidence, score)| 1.0 - (confidence * score).clamp(0.0, 1.0))
        .product();
    (1.0 - miss).clamp(0.0, 1.0)
}

/// Blend new evidence with the previous value
pub fn damp(new: f64, previous: f64, w_updt: f64) -> f64 {
    (new * w_updt + previous * (1.0 - w_updt)).clamp(0.0, 1.0)
}

/// Confidence update rules for one run
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceEngine {
    use_rlogf: bool,
    w_updt: f64,
}

impl ConfidenceEngine {
    pub fn new(use_rlogf: bool, w_updt: f64) -> Self {
        Self { use_rlogf, w_updt }
    }

    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(config.use_rlogf, config.w_updt)
    }

    /// Recompute a pattern's confidence from its selectivity counters
    pub fn update_pattern(&self, pattern: &mut Pattern) {
        pattern.confidence_old = pattern.confidence;

        let total = pattern.extractions();
        pattern.confidence = if self.use_rlogf {
            rlogf(pattern.positive, total)
        } else {
            selectivity(pattern.positive, total)
        };
    }

    /// Recompute an instance's confidence from the patterns that matched it
    pub fn update_instance(
        &self,
        instance: &mut Instance,
        matches: &[PatternMatch],
        patterns: &PatternSet,
        iteration: usize,
    ) {
        instance.confidence_old = instance.confidence;

        let confidence = noisy_or(matches.iter().filter_map(|m| {
            patterns
                .get(m.pattern)
                .map(|p| (p.confidence, m.score))
        }));

        instance.confidence = if iteration > 0 {
            damp(confidence, instance.confidence_old, self.w_updt)
        } else {
            confidence
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::instance;
    use proptest::prelude::*;
    use snowball_core::InstanceId;

    #[test]
    fn test_selectivity() {
        assert_eq!(selectivity(3, 4), 0.75);
        assert_eq!(selectivity(0, 0), 0.0);
    }

    #[test]
    fn test_rlogf_penalizes_low_support() {
        assert_eq!(rlogf(1, 1), 0.0);
        assert!((rlogf(2, 2) - 0.5).abs() < 1e-12);
        assert!(rlogf(8, 8) > rlogf(2, 2));
        assert!(rlogf(8, 8) < 1.0);
    }

    #[test]
    fn test_noisy_or_single_match_identity() {
        let c = noisy_or([(0.8, 0.9)]);
        assert!((c - 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_noisy_or_clamps_scores_above_one() {
        // Weights (1, 1, 1) allow a score of up to 3
        assert_eq!(noisy_or([(0.9, 2.5)]), 1.0);
        assert_eq!(noisy_or([(0.6, 2.0), (0.5, 0.5)]), 1.0);
        // Below the clamp the score acts as a plain multiplier
        let c = noisy_or([(0.2, 2.0), (0.5, 0.5)]);
        assert!((c - (1.0 - 0.6 * 0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_noisy_or_accumulates() {
        let one = noisy_or([(0.5, 0.5)]);
        let three = noisy_or([(0.5, 0.5), (0.5, 0.5), (0.5, 0.5)]);
        assert!(three > one);
        assert!((three - (1.0 - 0.75f64.powi(3))).abs() < 1e-12);
        assert_eq!(noisy_or(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_update_pattern_keeps_previous() {
        let instances = vec![instance("A", "B", &[], &[(1, 1.0)], &[])];
        let mut set = PatternSet::new();
        let id = set.create(InstanceId(0), &instances);
        let pattern = set.get_mut(id).unwrap();

        pattern.confidence = 0.4;
        pattern.positive = 3;
        pattern.negative = 1;
        ConfidenceEngine::new(false, 0.5).update_pattern(pattern);

        assert_eq!(pattern.confidence_old, 0.4);
        assert_eq!(pattern.confidence, 0.75);
    }

    #[test]
    fn test_update_instance_damping() {
        let mut instances = vec![instance("A", "B", &[], &[(1, 1.0)], &[])];
        let mut set = PatternSet::new();
        let id = set.create(InstanceId(0), &instances);
        set.get_mut(id).unwrap().confidence = 1.0;

        let engine = ConfidenceEngine::new(false, 0.5);
        let matches = [PatternMatch { pattern: id, score: 0.8 }];

        engine.update_instance(&mut instances[0], &matches, &set, 0);
        assert!((instances[0].confidence - 0.8).abs() < 1e-12);

        set.get_mut(id).unwrap().confidence = 0.5;
        engine.update_instance(&mut instances[0], &matches, &set, 1);
        // 0.5 * 0.4 + 0.5 * 0.8
        assert!((instances[0].confidence - 0.6).abs() < 1e-12);
        assert!((instances[0].confidence_old - 0.8).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_confidence_stays_in_unit_range(
            evidence in prop::collection::vec((0.0f64..=1.0, 0.0f64..=3.0), 0..8),
            previous in 0.0f64..=1.0,
            w_updt in 0.0f64..=1.0,
            positive in 0usize..50,
            extra in 0usize..50,
        ) {
            let c = noisy_or(evidence.iter().copied());
            prop_assert!((0.0..=1.0).contains(&c));
            prop_assert!((0.0..=1.0).contains(&damp(c, previous, w_updt)));
            prop_assert!((0.0..=1.0).contains(&selectivity(positive, positive + extra)));
            prop_assert!((0.0..=1.0).contains(&rlogf(positive, positive + extra)));
        }
    }
}
