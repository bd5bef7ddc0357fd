//! Snowball Extractor - Candidate relation extraction
//!
//! Turns a corpus of entity-tagged sentences into relation instances
//! ready for bootstrapping:
//! - Tagged sentence parsing into entity pairs with context segments
//! - Tokenization and stop-word filtering
//! - TF-IDF vector-space model for context vectors
//! - Instance store construction and on-disk caching

use snowball_core::{Result, SparseVector};

/// Entity pair found in a sentence, with raw context text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRelationship {
    pub e1: String,
    pub e2: String,
    pub e1_type: String,
    pub e2_type: String,
    /// Sentence with tags removed
    pub sentence: String,
    pub before: String,
    pub between: String,
    pub after: String,
}

/// Trait for candidate extractors
pub trait CandidateExtractor: Send + Sync {
    /// Extract entity-pair candidates from one corpus line
    fn extract(&self, line: &str) -> Result<Vec<CandidateRelationship>>;

    /// Plain text of a corpus line, used to build the vector-space model
    fn plain_text(&self, line: &str) -> String;
}

/// Trait for segment vectorizers
pub trait Vectorizer: Send + Sync {
    /// Map filtered tokens to a term-weight vector.
    ///
    /// Returns `None` when nothing in the input carries weight.
    fn vectorize(&self, tokens: &[String]) -> Option<SparseVector>;
}

pub mod cache;
pub mod sentence;
pub mod store;
pub mod tokenizer;
pub mod vsm;

pub use cache::ArtifactCache;
pub use sentence::TaggedSentenceExtractor;
pub use store::{Corpus, InstanceStore};
pub use tokenizer::Tokenizer;
pub use vsm::TfIdfModel;
