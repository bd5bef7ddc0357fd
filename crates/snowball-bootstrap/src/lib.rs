//! Snowball Bootstrap - Semi-supervised relation extraction
//!
//! Starting from a handful of seed pairs, the engine repeatedly:
//! 1. finds instances whose entity pair is a seed,
//! 2. clusters their contexts into extraction patterns,
//! 3. scores every instance against the patterns,
//! 4. propagates confidence to patterns and instances,
//! 5. promotes confident instances to seeds.

pub mod cluster;
pub mod confidence;
pub mod controller;
pub mod pattern;
pub mod report;
pub mod similarity;
pub mod state;

#[cfg(test)]
mod testing;

pub use cluster::{ClusterOutcome, ClusteringEngine};
pub use confidence::{ConfidenceEngine, PatternMatch};
pub use controller::{Bootstrap, BootstrapOutcome, IterationStats, Phase};
pub use pattern::{Centroid, Pattern, PatternId, PatternSet};
pub use report::BootstrapReport;
pub use similarity::SimilarityScorer;
pub use state::BootstrapState;
