//! Single-pass clustering of seed-matched instances into patterns
//!
//! The pass is order-sensitive and deterministic for a fixed input order:
//! each instance joins the first pattern with the highest similarity, or
//! founds a new pattern when that similarity is below the threshold.

use snowball_core::{Instance, InstanceId};

use crate::pattern::{PatternId, PatternSet};
use crate::similarity::SimilarityScorer;

/// What a clustering pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterOutcome {
    /// Instances that joined an existing pattern
    pub joined: usize,
    /// Instances already in their best pattern
    pub unchanged: usize,
    /// Patterns founded during the pass
    pub founded: usize,
}

/// Single-pass clustering engine
#[derive(Debug, Clone, Copy)]
pub struct ClusteringEngine {
    scorer: SimilarityScorer,
    threshold: f64,
}

impl ClusteringEngine {
    pub fn new(scorer: SimilarityScorer, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    /// Cluster `matched` instances into `patterns`, extending existing
    /// patterns and appending new ones.
    pub fn cluster(
        &self,
        matched: &[InstanceId],
        instances: &[Instance],
        patterns: &mut PatternSet,
    ) -> ClusterOutcome {
        let mut outcome = ClusterOutcome::default();
        let mut remaining = matched;

        if patterns.is_empty() {
            let Some((&first, rest)) = matched.split_first() else {
                return outcome;
            };
            patterns.create(first, instances);
            outcome.founded += 1;
            remaining = rest;
        }

        for &id in remaining {
            let Some(instance) = instances.get(id.0) else {
                continue;
            };

            let mut best_score = 0.0;
            let mut best_index = 0;
            for (index, pattern) in patterns.active().enumerate() {
                let score = self.scorer.score(instance, pattern);
                if score > best_score {
                    best_score = score;
                    best_index = index;
                }
            }

            if best_score < self.threshold {
                patterns.create(id, instances);
                outcome.founded += 1;
                continue;
            }

            let best: PatternId = patterns.active_ids()[best_index];
            let added = patterns
                .get_mut(best)
                .map_or(false, |p| p.add_member(id, instances));
            if added {
                outcome.joined += 1;
            } else {
                outcome.unchanged += 1;
            }
        }

        tracing::debug!(
            joined = outcome.joined,
            unchanged = outcome.unchanged,
            founded = outcome.founded,
            "Clustering pass finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{instance, vec_strategy};
    use proptest::prelude::*;

    fn engine(threshold: f64) -> ClusteringEngine {
        ClusteringEngine::new(SimilarityScorer::new(0.0, 1.0, 0.0), threshold)
    }

    fn ids(n: usize) -> Vec<InstanceId> {
        (0..n).map(InstanceId).collect()
    }

    #[test]
    fn test_first_instance_founds_pattern() {
        let instances = vec![instance("A", "B", &[], &[(1, 1.0)], &[])];
        let mut patterns = PatternSet::new();

        let outcome = engine(0.5).cluster(&ids(1), &instances, &mut patterns);
        assert_eq!(outcome.founded, 1);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns.active().next().unwrap().members(), &[InstanceId(0)]);
    }

    #[test]
    fn test_similar_instances_share_pattern() {
        let instances = vec![
            instance("A", "B", &[], &[(1, 1.0)], &[]),
            instance("C", "D", &[], &[(1, 1.0), (2, 0.1)], &[]),
            instance("E", "F", &[], &[(5, 1.0)], &[]),
        ];
        let mut patterns = PatternSet::new();

        let outcome = engine(0.5).cluster(&ids(3), &instances, &mut patterns);
        assert_eq!(outcome, ClusterOutcome { joined: 1, unchanged: 0, founded: 2 });

        let supports: Vec<usize> = patterns.active().map(|p| p.support()).collect();
        assert_eq!(supports, vec![2, 1]);
    }

    #[test]
    fn test_ties_go_to_earliest_pattern() {
        let instances = vec![
            instance("A", "B", &[], &[(1, 1.0)], &[]),
            instance("C", "D", &[], &[(2, 1.0)], &[]),
            // Equally similar to both patterns
            instance("E", "F", &[], &[(1, 1.0), (2, 1.0)], &[]),
        ];
        let mut patterns = PatternSet::new();

        engine(0.5).cluster(&ids(3), &instances, &mut patterns);
        let first = patterns.active().next().unwrap();
        assert_eq!(first.members(), &[InstanceId(0), InstanceId(2)]);
    }

    #[test]
    fn test_extends_existing_patterns() {
        let instances = vec![
            instance("A", "B", &[], &[(1, 1.0)], &[]),
            instance("C", "D", &[], &[(1, 1.0)], &[]),
        ];
        let mut patterns = PatternSet::new();
        patterns.create(InstanceId(0), &instances);

        let outcome = engine(0.5).cluster(&ids(2), &instances, &mut patterns);
        assert_eq!(outcome, ClusterOutcome { joined: 1, unchanged: 1, founded: 0 });
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let mut patterns = PatternSet::new();
        let outcome = engine(0.5).cluster(&[], &[], &mut patterns);
        assert_eq!(outcome, ClusterOutcome::default());
        assert!(patterns.is_empty());
    }

    proptest! {
        #[test]
        fn prop_clustering_is_deterministic(
            vectors in prop::collection::vec(vec_strategy(), 1..12),
            threshold in 0.0f64..1.0,
        ) {
            let instances: Vec<Instance> = vectors
                .into_iter()
                .map(|v| {
                    let mut inst = instance("A", "B", &[], &[], &[]);
                    inst.between.vector = v;
                    inst
                })
                .collect();
            let matched = ids(instances.len());

            let mut first = PatternSet::new();
            let mut second = PatternSet::new();
            engine(threshold).cluster(&matched, &instances, &mut first);
            engine(threshold).cluster(&matched, &instances, &mut second);

            let a: Vec<Vec<InstanceId>> = first.active().map(|p| p.members().to_vec()).collect();
            let b: Vec<Vec<InstanceId>> = second.active().map(|p| p.members().to_vec()).collect();
            prop_assert_eq!(a, b);
        }
    }
}
