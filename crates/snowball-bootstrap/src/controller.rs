//! Bootstrap controller
//!
//! Drives the iteration state machine:
//!
//! ```text
//! INIT -> MATCH_SEEDS -> CLUSTER -> PRUNE -> SCORE -> PROMOTE -> (next | DONE)
//!              |                       |
//!              +-------> ABORT <-------+
//! ```
//!
//! Scoring runs in parallel over instances against a frozen pattern list;
//! every mutation happens afterwards in a single sequential pass.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::Serialize;

use snowball_core::{BootstrapConfig, Instance, InstanceId, Result, Seed, SnowballError};
use snowball_extractor::InstanceStore;

use crate::cluster::ClusteringEngine;
use crate::confidence::{ConfidenceEngine, PatternMatch};
use crate::pattern::Pattern;
use crate::similarity::SimilarityScorer;
use crate::state::BootstrapState;

/// Controller phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    MatchSeeds,
    Cluster,
    Prune,
    Score,
    Promote,
    Done,
    Abort,
}

/// Counters for one completed iteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IterationStats {
    pub iteration: usize,
    /// Instances matching a seed
    pub matched: usize,
    /// Patterns founded by clustering
    pub founded: usize,
    /// Patterns dropped by pruning
    pub pruned: usize,
    /// Active patterns after pruning
    pub patterns: usize,
    /// Instances extracted by some pattern in this iteration
    pub extracted: usize,
    /// Seeds added by promotion
    pub promoted: usize,
    /// Seed set size at the end of the iteration
    pub seeds: usize,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub instances: Vec<Instance>,
    pub state: BootstrapState,
    pub history: Vec<IterationStats>,
}

/// Bootstrap controller owning the instances and the run state
pub struct Bootstrap {
    config: BootstrapConfig,
    scorer: SimilarityScorer,
    clustering: ClusteringEngine,
    confidence: ConfidenceEngine,
    instances: Vec<Instance>,
    state: BootstrapState,
    phase: Phase,
    history: Vec<IterationStats>,
}

impl Bootstrap {
    /// Create a controller; the configuration is validated up front
    pub fn new(
        config: BootstrapConfig,
        store: InstanceStore,
        seeds: BTreeSet<Seed>,
    ) -> Result<Self> {
        config.validate()?;

        let scorer = SimilarityScorer::from_config(&config);
        Ok(Self {
            clustering: ClusteringEngine::new(scorer, config.threshold_similarity),
            confidence: ConfidenceEngine::from_config(&config),
            scorer,
            config,
            instances: store.into_instances(),
            state: BootstrapState::new(seeds),
            phase: Phase::Init,
            history: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn history(&self) -> &[IterationStats] {
        &self.history
    }

    /// Run all iterations
    pub fn run(mut self) -> Result<BootstrapOutcome> {
        if self.config.number_iterations == 0 {
            tracing::warn!("number_iterations is 0, nothing to do");
        }

        for iteration in 0..self.config.number_iterations {
            self.run_iteration(iteration)?;
        }

        self.phase = Phase::Done;
        tracing::info!(
            iterations = self.history.len(),
            seeds = self.state.seeds.len(),
            patterns = self.state.patterns.len(),
            extracted = self.state.candidates.len(),
            "Bootstrap finished"
        );

        Ok(BootstrapOutcome {
            instances: self.instances,
            state: self.state,
            history: self.history,
        })
    }

    /// Run one iteration through every phase
    pub fn run_iteration(&mut self, iteration: usize) -> Result<&IterationStats> {
        tracing::info!(iteration, seeds = self.state.seeds.len(), "Starting iteration");
        for seed in &self.state.seeds {
            tracing::debug!(e1 = %seed.e1, e2 = %seed.e2, "Seed");
        }

        let mut stats = IterationStats {
            iteration,
            ..Default::default()
        };

        self.phase = Phase::MatchSeeds;
        let matched = self.match_seeds();
        if matched.is_empty() {
            self.phase = Phase::Abort;
            tracing::error!(iteration, "No seed matches found");
            return Err(SnowballError::NoSeedMatches { iteration });
        }
        stats.matched = matched.len();

        self.phase = Phase::Cluster;
        let outcome = self
            .clustering
            .cluster(&matched, &self.instances, &mut self.state.patterns);
        stats.founded = outcome.founded;

        self.phase = Phase::Prune;
        stats.pruned = self.state.patterns.prune(self.config.min_pattern_support);
        stats.patterns = self.state.patterns.len();
        tracing::info!(iteration, patterns = stats.patterns, pruned = stats.pruned, "Patterns generated");
        if iteration == 0 && self.state.patterns.is_empty() {
            self.phase = Phase::Abort;
            tracing::error!(iteration, "No patterns generated");
            return Err(SnowballError::NoPatterns { iteration });
        }

        self.phase = Phase::Score;
        stats.extracted = self.score(iteration);

        self.phase = Phase::Promote;
        if iteration + 1 < self.config.number_iterations {
            stats.promoted = self.promote();
        }
        stats.seeds = self.state.seeds.len();

        tracing::info!(
            iteration,
            matched = stats.matched,
            extracted = stats.extracted,
            promoted = stats.promoted,
            "Iteration finished"
        );
        self.history.push(stats);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Instances whose pair equals a current seed, in instance order
    pub fn match_seeds(&self) -> Vec<InstanceId> {
        let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        let matched: Vec<InstanceId> = self
            .instances
            .iter()
            .enumerate()
            .filter(|(_, inst)| self.state.seeds.iter().any(|s| inst.matches(s)))
            .map(|(i, inst)| {
                *counts.entry((inst.e1.as_str(), inst.e2.as_str())).or_insert(0) += 1;
                InstanceId(i)
            })
            .collect();

        let mut sorted: Vec<_> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        for ((e1, e2), count) in sorted {
            tracing::debug!(e1, e2, count, "Seed matches");
        }

        matched
    }

    /// Score every instance against the active patterns and update
    /// pattern and instance confidence. Returns the number of instances
    /// extracted in this pass.
    fn score(&mut self, iteration: usize) -> usize {
        let threshold = self.config.threshold_similarity;
        let scorer = self.scorer;
        let active: Vec<&Pattern> = self.state.patterns.active().collect();

        let best: Vec<Option<PatternMatch>> = self
            .instances
            .par_iter()
            .map(|instance| best_match(&scorer, instance, &active, threshold))
            .collect();

        let active_ids = self.state.patterns.active_ids().to_vec();
        for id in &active_ids {
            if let Some(pattern) = self.state.patterns.get_mut(*id) {
                pattern.reset_selectivity();
            }
        }

        let mut extracted = 0;
        for (index, found) in best.into_iter().enumerate() {
            let Some(found) = found else {
                continue;
            };
            extracted += 1;

            let positive = self.state.seeds.contains(&self.instances[index].pair());
            if let Some(pattern) = self.state.patterns.get_mut(found.pattern) {
                pattern.record_extraction(positive);
            }
            self.state
                .record_match(InstanceId(index), found.pattern, found.score);
        }

        for id in &active_ids {
            if let Some(pattern) = self.state.patterns.get_mut(*id) {
                self.confidence.update_pattern(pattern);
                tracing::debug!(
                    pattern = %pattern.id,
                    positive = pattern.positive,
                    negative = pattern.negative,
                    confidence = pattern.confidence,
                    "Pattern confidence"
                );
            }
        }

        for (id, matches) in &self.state.candidates {
            if let Some(instance) = self.instances.get_mut(id.0) {
                self.confidence
                    .update_instance(instance, matches, &self.state.patterns, iteration);
            }
        }

        extracted
    }

    /// Add the pair of every instance at or above the confidence threshold
    /// to the seed set. Returns the number of new seeds.
    fn promote(&mut self) -> usize {
        let before = self.state.seeds.len();
        for id in self.state.candidates.keys() {
            let instance = &self.instances[id.0];
            if instance.confidence >= self.config.instance_confidence
                && self.state.seeds.insert(instance.pair())
            {
                tracing::info!(e1 = %instance.e1, e2 = %instance.e2, confidence = instance.confidence, "Promoted to seed");
            }
        }
        self.state.seeds.len() - before
    }
}

/// First active pattern with the highest score, if it reaches the threshold
fn best_match(
    scorer: &SimilarityScorer,
    instance: &Instance,
    patterns: &[&Pattern],
    threshold: f64,
) -> Option<PatternMatch> {
    let mut best: Option<PatternMatch> = None;
    for pattern in patterns {
        let score = scorer.score(instance, pattern);
        if best.map_or(true, |b| score > b.score) {
            best = Some(PatternMatch {
                pattern: pattern.id,
                score,
            });
        }
    }
    best.filter(|b| b.score >= threshold)
}
