//! Mutable bootstrap state owned by the controller

use std::collections::{BTreeMap, BTreeSet};

use snowball_core::{InstanceId, Seed};

use crate::confidence::PatternMatch;
use crate::pattern::{PatternId, PatternSet};

/// Seeds, patterns and instance -> pattern matches
#[derive(Debug, Clone, Default)]
pub struct BootstrapState {
    /// Seed pairs; only ever grows
    pub seeds: BTreeSet<Seed>,

    /// Pattern arena and active list
    pub patterns: PatternSet,

    /// Patterns that extracted each instance, keyed by instance id.
    /// Entries accumulate across iterations.
    pub candidates: BTreeMap<InstanceId, Vec<PatternMatch>>,
}

impl BootstrapState {
    pub fn new(seeds: BTreeSet<Seed>) -> Self {
        Self {
            seeds,
            ..Default::default()
        }
    }

    /// Record that `pattern` extracted `instance` with `score`.
    ///
    /// A repeated extraction by the same pattern refreshes the score.
    pub fn record_match(&mut self, instance: InstanceId, pattern: PatternId, score: f64) {
        let matches = self.candidates.entry(instance).or_default();
        match matches.iter_mut().find(|m| m.pattern == pattern) {
            Some(existing) => existing.score = score,
            None => matches.push(PatternMatch { pattern, score }),
        }
    }

    pub fn matches(&self, instance: InstanceId) -> &[PatternMatch] {
        self.candidates
            .get(&instance)
            .map(|m| m.as_slice())
            .unwrap_or(&[])
    }
}
