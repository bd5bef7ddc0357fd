//! Test fixtures shared by the unit tests

use proptest::prelude::*;
use snowball_core::{Instance, SegmentContext, SparseVector};

pub fn vec_of(entries: &[(u32, f64)]) -> SparseVector {
    SparseVector::from_entries(entries.iter().copied())
}

fn segment(entries: &[(u32, f64)]) -> SegmentContext {
    if entries.is_empty() {
        return SegmentContext::default();
    }
    let tokens = entries.iter().map(|(t, _)| format!("t{t}")).collect();
    SegmentContext::new("", tokens, Some(vec_of(entries)))
}

/// Instance with the given segment vectors; an empty slice means no vector
pub fn instance(
    e1: &str,
    e2: &str,
    before: &[(u32, f64)],
    between: &[(u32, f64)],
    after: &[(u32, f64)],
) -> Instance {
    Instance {
        e1: e1.to_string(),
        e2: e2.to_string(),
        e1_type: "ORG".to_string(),
        e2_type: "LOC".to_string(),
        sentence: format!("{e1} ... {e2}"),
        sentence_id: 0,
        before: segment(before),
        between: segment(between),
        after: segment(after),
        confidence: 0.0,
        confidence_old: 0.0,
    }
}

/// Optional non-negative sparse vector
pub fn vec_strategy() -> impl Strategy<Value = Option<SparseVector>> {
    prop::option::of(
        prop::collection::vec((0u32..8, 0.0f64..5.0), 1..6).prop_map(SparseVector::from_entries),
    )
}
