//! Extraction patterns
//!
//! A pattern is a cluster of instances with similar context, summarised by
//! one centroid vector per segment. Patterns live in an arena addressed by
//! `PatternId`; pruning only removes ids from the active list, so ids held
//! elsewhere stay valid.

use serde::Serialize;

use snowball_core::{Instance, InstanceId, Segment, SparseVector};

/// Stable index of a pattern in the pattern arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PatternId(pub usize);

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Per-segment mean of member vectors
#[derive(Debug, Clone, Default)]
pub struct Centroid {
    pub before: Option<SparseVector>,
    pub between: Option<SparseVector>,
    pub after: Option<SparseVector>,
}

impl Centroid {
    pub fn get(&self, segment: Segment) -> Option<&SparseVector> {
        match segment {
            Segment::Before => self.before.as_ref(),
            Segment::Between => self.between.as_ref(),
            Segment::After => self.after.as_ref(),
        }
    }

    /// Mean of the members' vectors; members without a vector for a
    /// segment do not contribute to that segment.
    fn of(members: &[InstanceId], instances: &[Instance]) -> Self {
        let mean = |segment: Segment| {
            SparseVector::mean_of(
                members
                    .iter()
                    .filter_map(|id| instances.get(id.0))
                    .filter_map(|inst| inst.vector(segment)),
            )
        };

        Self {
            before: mean(Segment::Before),
            between: mean(Segment::Between),
            after: mean(Segment::After),
        }
    }
}

/// Cluster of instances used to extract new instances
#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: PatternId,

    /// Members in insertion order, without duplicates
    members: Vec<InstanceId>,

    centroid: Centroid,

    /// Confidence after the latest update, in [0, 1]
    pub confidence: f64,

    /// Confidence before the latest update, in [0, 1]
    pub confidence_old: f64,

    /// Extractions whose pair is a seed
    pub positive: usize,

    /// Extractions whose pair is not a seed
    pub negative: usize,
}

impl Pattern {
    /// Create a pattern whose only member is `founder`
    pub fn new(id: PatternId, founder: InstanceId, instances: &[Instance]) -> Self {
        let members = vec![founder];
        let centroid = Centroid::of(&members, instances);
        Self {
            id,
            members,
            centroid,
            confidence: 0.0,
            confidence_old: 0.0,
            positive: 0,
            negative: 0,
        }
    }

    /// Add a member and recompute the centroid.
    ///
    /// Returns false (and changes nothing) if the instance is already a member.
    pub fn add_member(&mut self, id: InstanceId, instances: &[Instance]) -> bool {
        if self.contains(id) {
            return false;
        }
        self.members.push(id);
        self.centroid = Centroid::of(&self.members, instances);
        true
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.members.contains(&id)
    }

    pub fn members(&self) -> &[InstanceId] {
        &self.members
    }

    /// Number of member instances
    pub fn support(&self) -> usize {
        self.members.len()
    }

    pub fn centroid(&self) -> &Centroid {
        &self.centroid
    }

    /// Total extractions counted for selectivity
    pub fn extractions(&self) -> usize {
        self.positive + self.negative
    }

    pub fn reset_selectivity(&mut self) {
        self.positive = 0;
        self.negative = 0;
    }

    pub fn record_extraction(&mut self, positive: bool) {
        if positive {
            self.positive += 1;
        } else {
            self.negative += 1;
        }
    }

    /// Human-readable summary: the distinct between-contexts of the members
    pub fn description(&self, instances: &[Instance]) -> Vec<String> {
        let mut contexts: Vec<String> = Vec::new();
        for inst in self.members.iter().filter_map(|id| instances.get(id.0)) {
            let text = inst.between.text.trim();
            if !contexts.iter().any(|c| c == text) {
                contexts.push(text.to_string());
            }
        }
        contexts
    }
}

// ============================================================================
// Pattern Set
// ============================================================================

/// Pattern arena plus the ordered list of active patterns
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    arena: Vec<Pattern>,
    active: Vec<PatternId>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Found a new pattern and append it to the active list
    pub fn create(&mut self, founder: InstanceId, instances: &[Instance]) -> PatternId {
        let id = PatternId(self.arena.len());
        self.arena.push(Pattern::new(id, founder, instances));
        self.active.push(id);
        id
    }

    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: PatternId) -> Option<&mut Pattern> {
        self.arena.get_mut(id.0)
    }

    /// Active pattern ids in list order
    pub fn active_ids(&self) -> &[PatternId] {
        &self.active
    }

    /// Active patterns in list order
    pub fn active(&self) -> impl Iterator<Item = &Pattern> {
        self.active.iter().filter_map(|id| self.arena.get(id.0))
    }

    /// Number of active patterns
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop active patterns with fewer than `min_support` members.
    ///
    /// Returns the number of patterns dropped. Members of dropped patterns
    /// are not reassigned.
    pub fn prune(&mut self, min_support: usize) -> usize {
        let before = self.active.len();
        let arena = &self.arena;
        self.active
            .retain(|id| arena.get(id.0).map_or(false, |p| p.support() >= min_support));
        before - self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{instance, vec_of};

    #[test]
    fn test_new_pattern_centroid_is_founder() {
        let instances = vec![instance("A", "B", &[(0, 1.0)], &[(1, 1.0)], &[])];
        let pattern = Pattern::new(PatternId(0), InstanceId(0), &instances);

        assert_eq!(pattern.support(), 1);
        assert_eq!(pattern.centroid().before, Some(vec_of(&[(0, 1.0)])));
        assert!(pattern.centroid().after.is_none());
    }

    #[test]
    fn test_add_member_recomputes_mean() {
        let instances = vec![
            instance("A", "B", &[], &[(1, 1.0)], &[]),
            instance("C", "D", &[(0, 2.0)], &[(1, 3.0)], &[]),
        ];
        let mut pattern = Pattern::new(PatternId(0), InstanceId(0), &instances);

        assert!(pattern.add_member(InstanceId(1), &instances));
        assert_eq!(pattern.centroid().between, Some(vec_of(&[(1, 2.0)])));
        // Only the second member has a before vector
        assert_eq!(pattern.centroid().before, Some(vec_of(&[(0, 2.0)])));
    }

    #[test]
    fn test_add_existing_member_is_noop() {
        let instances = vec![instance("A", "B", &[], &[(1, 1.0)], &[])];
        let mut pattern = Pattern::new(PatternId(0), InstanceId(0), &instances);

        assert!(!pattern.add_member(InstanceId(0), &instances));
        assert_eq!(pattern.support(), 1);
    }

    #[test]
    fn test_prune_keeps_arena_ids() {
        let instances = vec![
            instance("A", "B", &[], &[(1, 1.0)], &[]),
            instance("C", "D", &[], &[(1, 1.0)], &[]),
            instance("E", "F", &[], &[(2, 1.0)], &[]),
        ];
        let mut set = PatternSet::new();
        let p0 = set.create(InstanceId(0), &instances);
        let p1 = set.create(InstanceId(2), &instances);
        set.get_mut(p0).unwrap().add_member(InstanceId(1), &instances);

        assert_eq!(set.prune(2), 1);
        assert_eq!(set.active_ids(), &[p0]);
        assert!(set.get(p1).is_some());
        assert!(set.active().all(|p| p.support() >= 2));
    }

    #[test]
    fn test_description_distinct_between_contexts() {
        let mut instances = vec![
            instance("A", "B", &[], &[(1, 1.0)], &[]),
            instance("C", "D", &[], &[(1, 1.0)], &[]),
        ];
        instances[0].between.text = "is headquartered in".to_string();
        instances[1].between.text = "is headquartered in".to_string();

        let mut pattern = Pattern::new(PatternId(0), InstanceId(0), &instances);
        pattern.add_member(InstanceId(1), &instances);
        assert_eq!(pattern.description(&instances), vec!["is headquartered in"]);
    }
}
