//! Ranked output of a bootstrap run
//!
//! Relationships are ordered by confidence (descending), then instance id.
//! Patterns are ordered by confidence (descending), then support
//! (descending), then pattern id.

use std::cmp::Ordering;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use snowball_core::{InstanceId, Result, Seed, SnowballError};

use crate::controller::{BootstrapOutcome, IterationStats};
use crate::pattern::{Pattern, PatternId};

/// A pattern that extracted a relationship
#[derive(Debug, Clone, Serialize)]
pub struct PatternSupport {
    pub pattern_id: PatternId,
    pub description: Vec<String>,
    pub score: f64,
}

/// An extracted relationship with its evidence
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipRecord {
    pub instance_id: InstanceId,
    pub e1: String,
    pub e2: String,
    pub confidence: f64,
    pub sentence: String,
    pub patterns: Vec<PatternSupport>,
}

/// A final extraction pattern
#[derive(Debug, Clone, Serialize)]
pub struct PatternRecord {
    pub pattern_id: PatternId,
    pub confidence: f64,
    pub support: usize,
    pub members: Vec<Seed>,
    pub description: Vec<String>,
}

/// Full report of a run
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub generated_at: DateTime<Utc>,
    pub iterations: Vec<IterationStats>,
    pub seeds: Vec<Seed>,
    pub relationships: Vec<RelationshipRecord>,
    pub patterns: Vec<PatternRecord>,
}

impl BootstrapReport {
    /// Build the ranked report from a finished run
    pub fn from_outcome(outcome: &BootstrapOutcome) -> Self {
        let instances = &outcome.instances;
        let patterns = &outcome.state.patterns;

        let mut relationships: Vec<RelationshipRecord> = outcome
            .state
            .candidates
            .iter()
            .filter_map(|(id, matches)| {
                let instance = instances.get(id.0)?;
                Some(RelationshipRecord {
                    instance_id: *id,
                    e1: instance.e1.clone(),
                    e2: instance.e2.clone(),
                    confidence: instance.confidence,
                    sentence: instance.sentence.clone(),
                    patterns: matches
                        .iter()
                        .filter_map(|m| {
                            let pattern = patterns.get(m.pattern)?;
                            Some(PatternSupport {
                                pattern_id: m.pattern,
                                description: pattern.description(instances),
                                score: m.score,
                            })
                        })
                        .collect(),
                })
            })
            .collect();
        relationships.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.instance_id.cmp(&b.instance_id))
        });

        let mut ranked: Vec<&Pattern> = patterns.active().collect();
        ranked.sort_by(|a, b| pattern_order(a, b));
        let patterns = ranked
            .into_iter()
            .map(|p| PatternRecord {
                pattern_id: p.id,
                confidence: p.confidence,
                support: p.support(),
                members: p
                    .members()
                    .iter()
                    .filter_map(|id| instances.get(id.0))
                    .map(|inst| inst.pair())
                    .collect(),
                description: p.description(instances),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            iterations: outcome.history.clone(),
            seeds: outcome.state.seeds.iter().cloned().collect(),
            relationships,
            patterns,
        }
    }

    /// Render extracted relationships in the `relationships.txt` format
    pub fn render_relationships(&self) -> String {
        let mut out = String::new();
        for r in &self.relationships {
            out.push_str(&format!("instance: {}\t{}\tscore:{}\n", r.e1, r.e2, r.confidence));
            out.push_str(&format!("sentence: {}\n", r.sentence));
            for p in &r.patterns {
                out.push_str(&format!("pattern: {}\n", p.description.join(", ")));
            }
            out.push('\n');
        }
        out
    }

    /// Render patterns in the `patterns.txt` format
    pub fn render_patterns(&self) -> String {
        self.patterns
            .iter()
            .map(|p| {
                let members: Vec<String> = p
                    .members
                    .iter()
                    .map(|s| format!("({}, {})", s.e1, s.e2))
                    .collect();
                format!("[{}]\t{}\n", members.join(", "), p.confidence)
            })
            .collect()
    }

    /// Write `relationships.txt`, `patterns.txt` and `report.json` to `dir`
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| SnowballError::io(dir, e))?;

        let write = |name: &str, content: String| {
            let path = dir.join(name);
            std::fs::write(&path, content).map_err(|e| SnowballError::io(&path, e))
        };

        write("relationships.txt", self.render_relationships())?;
        write("patterns.txt", self.render_patterns())?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SnowballError::Serialization(e.to_string()))?;
        write("report.json", json)?;

        tracing::info!(
            dir = %dir.display(),
            relationships = self.relationships.len(),
            patterns = self.patterns.len(),
            "Wrote reports"
        );
        Ok(())
    }
}

/// Total order for output: confidence desc, support desc, id asc
pub fn pattern_order(a: &Pattern, b: &Pattern) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then(b.support().cmp(&a.support()))
        .then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::PatternMatch;
    use crate::state::BootstrapState;
    use crate::testing::instance;

    fn outcome() -> BootstrapOutcome {
        let mut instances = vec![
            instance("Google", "Mountain View", &[], &[(1, 1.0)], &[]),
            instance("Apple", "Cupertino", &[], &[(1, 1.0)], &[]),
            instance("Acme", "Springfield", &[], &[(2, 1.0)], &[]),
            instance("Initech", "Austin", &[], &[(2, 1.0)], &[]),
            instance("Globex", "Cypress Creek", &[], &[(2, 1.0)], &[]),
        ];
        for inst in &mut instances {
            inst.between.text = "is based in".to_string();
        }
        instances[0].confidence = 0.4;
        instances[1].confidence = 0.9;

        let mut state = BootstrapState::default();
        let p0 = state.patterns.create(InstanceId(0), &instances);
        state.patterns.get_mut(p0).unwrap().add_member(InstanceId(1), &instances);
        let p1 = state.patterns.create(InstanceId(2), &instances);
        for id in [3, 4] {
            state.patterns.get_mut(p1).unwrap().add_member(InstanceId(id), &instances);
        }
        state.patterns.get_mut(p0).unwrap().confidence = 0.5;
        state.patterns.get_mut(p1).unwrap().confidence = 0.5;

        state.candidates.insert(InstanceId(0), vec![PatternMatch { pattern: p0, score: 0.8 }]);
        state.candidates.insert(InstanceId(1), vec![PatternMatch { pattern: p0, score: 0.9 }]);

        BootstrapOutcome {
            instances,
            state,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_relationships_sorted_by_confidence() {
        let report = BootstrapReport::from_outcome(&outcome());
        let pairs: Vec<&str> = report.relationships.iter().map(|r| r.e1.as_str()).collect();
        assert_eq!(pairs, vec!["Apple", "Google"]);
        assert_eq!(report.relationships[0].patterns[0].description, vec!["is based in"]);
    }

    #[test]
    fn test_patterns_tie_break_on_support() {
        let report = BootstrapReport::from_outcome(&outcome());
        let ids: Vec<PatternId> = report.patterns.iter().map(|p| p.pattern_id).collect();
        assert_eq!(ids, vec![PatternId(1), PatternId(0)]);
        assert_eq!(report.patterns[0].support, 3);
    }

    #[test]
    fn test_render_relationships() {
        let text = BootstrapReport::from_outcome(&outcome()).render_relationships();
        assert!(text.starts_with("instance: Apple\tCupertino\tscore:0.9\n"));
        assert!(text.contains("pattern: is based in\n"));
    }

    #[test]
    fn test_render_patterns() {
        let text = BootstrapReport::from_outcome(&outcome()).render_patterns();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[(Acme, Springfield), (Initech, Austin), (Globex, Cypress Creek)]\t0.5",
                "[(Google, Mountain View), (Apple, Cupertino)]\t0.5",
            ]
        );
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let report = BootstrapReport::from_outcome(&outcome());
        report.write_to_dir(dir.path()).unwrap();

        for name in ["relationships.txt", "patterns.txt", "report.json"] {
            assert!(dir.path().join(name).is_file(), "missing {name}");
        }
        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("report.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["patterns"].as_array().unwrap().len(), 2);
    }
}
