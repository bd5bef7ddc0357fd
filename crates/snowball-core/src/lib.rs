//! Snowball Core - Domain models, errors, and configuration
//!
//! This crate defines the shared abstractions used throughout the
//! Snowball relation-extraction workspace:
//! - Seeds and relation schemas
//! - Relation instances and their context segments
//! - Sparse term-weight vectors
//! - Common error types
//! - Configuration management and seed-file parsing

pub mod config;
pub mod instance;
pub mod seeds;
pub mod vector;

pub use config::{
    BootstrapConfig, ConfigError, ExtractionConfig, LoggingConfig, SnowballConfig,
};
pub use instance::{Instance, InstanceId, Segment, SegmentContext};
pub use seeds::SeedFile;
pub use vector::SparseVector;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Snowball operations
#[derive(Error, Debug)]
pub enum SnowballError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No seed matches found in iteration {iteration}")]
    NoSeedMatches { iteration: usize },

    #[error("No patterns generated in iteration {iteration}")]
    NoPatterns { iteration: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnowballError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is one of the bootstrap abort conditions
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::NoSeedMatches { .. } | Self::NoPatterns { .. })
    }
}

pub type Result<T> = std::result::Result<T, SnowballError>;

// ============================================================================
// Relation Models
// ============================================================================

/// A confirmed example entity pair for the target relation.
///
/// Ordering is lexicographic on `(e1, e2)` so seed sets iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seed {
    pub e1: String,
    pub e2: String,
}

impl Seed {
    pub fn new(e1: impl Into<String>, e2: impl Into<String>) -> Self {
        Self {
            e1: e1.into(),
            e2: e2.into(),
        }
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.e1, self.e2)
    }
}

/// Argument types of the target relation (e.g. ORG -> LOC)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationSchema {
    pub e1_type: String,
    pub e2_type: String,
}

impl RelationSchema {
    pub fn new(e1_type: impl Into<String>, e2_type: impl Into<String>) -> Self {
        Self {
            e1_type: e1_type.into(),
            e2_type: e2_type.into(),
        }
    }

    /// Check whether an entity pair's types match this relation
    pub fn accepts(&self, e1_type: &str, e2_type: &str) -> bool {
        self.e1_type == e1_type && self.e2_type == e2_type
    }
}

impl std::fmt::Display for RelationSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.e1_type, self.e2_type)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_equality_by_pair() {
        let a = Seed::new("Google", "Mountain View");
        let b = Seed::new("Google", "Mountain View");
        let c = Seed::new("Mountain View", "Google");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_seed_set_deduplicates() {
        let mut seeds = std::collections::BTreeSet::new();
        seeds.insert(Seed::new("Google", "Mountain View"));
        seeds.insert(Seed::new("Google", "Mountain View"));
        seeds.insert(Seed::new("Apple", "Cupertino"));

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds.iter().next().unwrap().e1, "Apple");
    }

    #[test]
    fn test_schema_accepts() {
        let schema = RelationSchema::new("ORG", "LOC");
        assert!(schema.accepts("ORG", "LOC"));
        assert!(!schema.accepts("LOC", "ORG"));
        assert_eq!(schema.to_string(), "ORG -> LOC");
    }

    #[test]
    fn test_abort_errors() {
        assert!(SnowballError::NoSeedMatches { iteration: 0 }.is_abort());
        assert!(SnowballError::NoPatterns { iteration: 0 }.is_abort());
        assert!(!SnowballError::InvalidInput("x".to_string()).is_abort());
        assert_eq!(
            SnowballError::NoPatterns { iteration: 0 }.to_string(),
            "No patterns generated in iteration 0"
        );
    }
}
