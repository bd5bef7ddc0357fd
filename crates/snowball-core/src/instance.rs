//! Relation instances
//!
//! An instance is one occurrence of a candidate entity pair in a sentence,
//! together with the three context segments around the entities.

use serde::{Deserialize, Serialize};

use crate::{Seed, SparseVector};

/// Stable index of an instance in the instance arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub usize);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Context segment position relative to the entity pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Context preceding e1
    Before,
    /// Context between e1 and e2
    Between,
    /// Context following e2
    After,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Before, Segment::Between, Segment::After];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Between => "between",
            Self::After => "after",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw text of a segment and its vector representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentContext {
    /// Original segment text
    pub text: String,

    /// Filtered tokens the vector was built from
    pub tokens: Vec<String>,

    /// Term-weight vector; absent when the segment filtered to nothing
    pub vector: Option<SparseVector>,
}

impl SegmentContext {
    pub fn new(text: impl Into<String>, tokens: Vec<String>, vector: Option<SparseVector>) -> Self {
        Self {
            text: text.into(),
            tokens,
            vector,
        }
    }

    /// Whether the segment has no usable tokens
    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Candidate relation instance
///
/// Everything except the two confidence fields is fixed at extraction time.
/// Identity is the arena index (`InstanceId`); confidence never takes part
/// in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub e1: String,
    pub e2: String,
    pub e1_type: String,
    pub e2_type: String,

    /// Sentence text with entity tags removed
    pub sentence: String,

    /// Index of the sentence in `Corpus::sentences`; blank input lines
    /// are not counted
    pub sentence_id: usize,

    pub before: SegmentContext,
    pub between: SegmentContext,
    pub after: SegmentContext,

    /// Confidence after the latest update, in [0, 1]
    pub confidence: f64,

    /// Confidence before the latest update, in [0, 1]
    pub confidence_old: f64,
}

impl Instance {
    /// Entity pair of this instance as a seed
    pub fn pair(&self) -> Seed {
        Seed::new(self.e1.clone(), self.e2.clone())
    }

    /// Exact (string-equal) match against a seed
    pub fn matches(&self, seed: &Seed) -> bool {
        self.e1 == seed.e1 && self.e2 == seed.e2
    }

    pub fn segment(&self, segment: Segment) -> &SegmentContext {
        match segment {
            Segment::Before => &self.before,
            Segment::Between => &self.between,
            Segment::After => &self.after,
        }
    }

    pub fn vector(&self, segment: Segment) -> Option<&SparseVector> {
        self.segment(segment).vector.as_ref()
    }

    /// Whether all three segments filtered to nothing
    pub fn is_context_free(&self) -> bool {
        Segment::ALL.iter().all(|s| self.segment(*s).is_blank())
    }
}
