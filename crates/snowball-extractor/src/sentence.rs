//! Tagged sentence parsing
//!
//! Sentences carry inline entity annotations:
//!
//! ```text
//! <ORG>Google</ORG> is headquartered in <LOC>Mountain View</LOC> .
//! ```
//!
//! Each pair of consecutive entity mentions whose distance is within the
//! configured token bounds becomes a candidate relationship.

use regex::Regex;

use crate::{CandidateExtractor, CandidateRelationship};
use snowball_core::{ExtractionConfig, Result, SnowballError};

/// Entity mention located by token offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    pub text: String,
    pub entity_type: String,
    /// First token of the mention
    pub start: usize,
    /// One past the last token of the mention
    pub end: usize,
}

/// Sentence with tags removed and mentions indexed by token
#[derive(Debug, Clone, Default)]
pub struct TaggedSentence {
    pub tokens: Vec<String>,
    pub mentions: Vec<EntityMention>,
}

impl TaggedSentence {
    /// Parse a tagged line.
    ///
    /// A tag whose closing name does not match its opening name is kept
    /// as plain text.
    pub fn parse(line: &str, tag_pattern: &Regex) -> Self {
        let mut sentence = Self::default();
        let mut cursor = 0;

        for caps in tag_pattern.captures_iter(line) {
            let (Some(whole), Some(open), Some(inner), Some(close)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };

            if open.as_str() != close.as_str() {
                continue;
            }

            sentence.push_text(&line[cursor..whole.start()]);

            let start = sentence.tokens.len();
            sentence.push_text(inner.as_str());
            let end = sentence.tokens.len();
            if end > start {
                sentence.mentions.push(EntityMention {
                    text: sentence.tokens[start..end].join(" "),
                    entity_type: open.as_str().to_string(),
                    start,
                    end,
                });
            }

            cursor = whole.end();
        }

        sentence.push_text(&line[cursor..]);
        sentence
    }

    fn push_text(&mut self, text: &str) {
        self.tokens
            .extend(text.split_whitespace().map(|t| t.to_string()));
    }

    /// Sentence text without tags
    pub fn plain_text(&self) -> String {
        self.tokens.join(" ")
    }

    fn span(&self, start: usize, end: usize) -> String {
        self.tokens[start..end].join(" ")
    }
}

/// Candidate extractor for inline-tagged sentences
pub struct TaggedSentenceExtractor {
    config: ExtractionConfig,
    tag_pattern: Regex,
}

impl TaggedSentenceExtractor {
    /// Create a new extractor
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let tag_pattern = Regex::new(r"<([A-Za-z][\w-]*)>(.+?)</([A-Za-z][\w-]*)>")
            .map_err(|e| SnowballError::InvalidInput(format!("entity tag pattern: {e}")))?;
        Ok(Self {
            config,
            tag_pattern,
        })
    }

    pub fn parse(&self, line: &str) -> TaggedSentence {
        TaggedSentence::parse(line, &self.tag_pattern)
    }

    fn candidates(&self, sentence: &TaggedSentence) -> Vec<CandidateRelationship> {
        let window = self.config.context_window_size;
        let plain = sentence.plain_text();

        sentence
            .mentions
            .windows(2)
            .filter_map(|pair| {
                let (m1, m2) = (&pair[0], &pair[1]);
                let distance = m2.start.saturating_sub(m1.end);
                if distance < self.config.min_tokens_away || distance > self.config.max_tokens_away {
                    return None;
                }

                let after_end = (m2.end + window).min(sentence.tokens.len());
                Some(CandidateRelationship {
                    e1: m1.text.clone(),
                    e2: m2.text.clone(),
                    e1_type: m1.entity_type.clone(),
                    e2_type: m2.entity_type.clone(),
                    sentence: plain.clone(),
                    before: sentence.span(m1.start.saturating_sub(window), m1.start),
                    between: sentence.span(m1.end, m2.start),
                    after: sentence.span(m2.end, after_end),
                })
            })
            .collect()
    }
}

impl CandidateExtractor for TaggedSentenceExtractor {
    fn extract(&self, line: &str) -> Result<Vec<CandidateRelationship>> {
        Ok(self.candidates(&self.parse(line)))
    }

    fn plain_text(&self, line: &str) -> String {
        self.parse(line).plain_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TaggedSentenceExtractor {
        TaggedSentenceExtractor::new(ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_mentions() {
        let sentence =
            extractor().parse("<ORG>Google</ORG> is headquartered in <LOC>Mountain View</LOC> .");

        assert_eq!(sentence.mentions.len(), 2);
        assert_eq!(sentence.mentions[1].text, "Mountain View");
        assert_eq!(sentence.mentions[1].start, 4);
        assert_eq!(sentence.mentions[1].end, 6);
        assert_eq!(
            sentence.plain_text(),
            "Google is headquartered in Mountain View ."
        );
    }

    #[test]
    fn test_extract_contexts() {
        let line = "Last year <ORG>Google</ORG> , based in <LOC>Mountain View</LOC> , grew fast again";
        let candidates = extractor().extract(line).unwrap();

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.e1, "Google");
        assert_eq!(c.e2, "Mountain View");
        assert_eq!(c.e1_type, "ORG");
        assert_eq!(c.before, "Last year");
        assert_eq!(c.between, ", based in");
        assert_eq!(c.after, ", grew");
    }

    #[test]
    fn test_distance_bounds() {
        // Adjacent entities fall below min_tokens_away = 1
        let candidates = extractor()
            .extract("<ORG>Google</ORG> <LOC>Mountain View</LOC>")
            .unwrap();
        assert!(candidates.is_empty());

        let far = "<ORG>Google</ORG> a b c d e f g <LOC>Mountain View</LOC>";
        assert!(extractor().extract(far).unwrap().is_empty());
    }

    #[test]
    fn test_only_consecutive_pairs() {
        let line = "<ORG>Google</ORG> and <ORG>Apple</ORG> are in <LOC>California</LOC>";
        let candidates = extractor().extract(line).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!((candidates[0].e1.as_str(), candidates[0].e2.as_str()), ("Google", "Apple"));
        assert_eq!((candidates[1].e1.as_str(), candidates[1].e2.as_str()), ("Apple", "California"));
    }

    #[test]
    fn test_mismatched_tags_are_text() {
        let sentence = extractor().parse("<ORG>Google</LOC> is in <LOC>Mountain View</LOC>");
        assert_eq!(sentence.mentions.len(), 1);
        assert_eq!(sentence.mentions[0].entity_type, "LOC");
    }
}
