//! Instance store
//!
//! Builds the arena of candidate relation instances from a tagged corpus.
//! Instances are addressed by `InstanceId`, their position in the arena,
//! which follows corpus order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::{fingerprint, ArtifactCache};
use crate::sentence::TaggedSentenceExtractor;
use crate::tokenizer::Tokenizer;
use crate::vsm::TfIdfModel;
use crate::{CandidateExtractor, Vectorizer};
use snowball_core::{
    ExtractionConfig, Instance, InstanceId, RelationSchema, Result, SegmentContext, SnowballError,
};

// ============================================================================
// Corpus
// ============================================================================

/// Tagged sentences, one per non-empty input line
#[derive(Debug, Clone)]
pub struct Corpus {
    sentences: Vec<String>,
    fingerprint: u64,
}

impl Corpus {
    /// Read a corpus file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SnowballError::io(path, e))?;
        Ok(Self::from_lines(content.lines()))
    }

    pub fn from_lines<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Self {
        let sentences: Vec<String> = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        let fingerprint = fingerprint(&sentences);
        Self {
            sentences,
            fingerprint,
        }
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Content fingerprint used in cache keys
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

// ============================================================================
// Instance Store
// ============================================================================

/// Arena of candidate relation instances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceStore {
    instances: Vec<Instance>,
}

impl InstanceStore {
    /// Wrap already-built instances
    pub fn from_instances(instances: Vec<Instance>) -> Self {
        Self { instances }
    }

    /// Extract, filter and vectorize instances from a corpus.
    ///
    /// Keeps only candidates whose argument types match `schema` and drops
    /// candidates whose three segments all tokenize to nothing.
    pub fn build(
        corpus: &Corpus,
        schema: &RelationSchema,
        extractor: &dyn CandidateExtractor,
        tokenizer: &Tokenizer,
        vectorizer: &dyn Vectorizer,
    ) -> Result<Self> {
        let mut instances = Vec::new();
        let mut wrong_type = 0usize;
        let mut no_context = 0usize;

        for (sentence_id, line) in corpus.sentences().iter().enumerate() {
            for candidate in extractor.extract(line)? {
                if !schema.accepts(&candidate.e1_type, &candidate.e2_type) {
                    wrong_type += 1;
                    continue;
                }

                let segment = |text: String| {
                    let tokens = tokenizer.tokenize(&text);
                    let vector = vectorizer.vectorize(&tokens);
                    SegmentContext::new(text, tokens, vector)
                };

                let instance = Instance {
                    before: segment(candidate.before),
                    between: segment(candidate.between),
                    after: segment(candidate.after),
                    e1: candidate.e1,
                    e2: candidate.e2,
                    e1_type: candidate.e1_type,
                    e2_type: candidate.e2_type,
                    sentence: candidate.sentence,
                    sentence_id,
                    confidence: 0.0,
                    confidence_old: 0.0,
                };

                if instance.is_context_free() {
                    no_context += 1;
                    continue;
                }
                instances.push(instance);
            }

            if (sentence_id + 1) % 10_000 == 0 {
                tracing::debug!(sentences = sentence_id + 1, "Extracting instances");
            }
        }

        tracing::info!(
            instances = instances.len(),
            wrong_type,
            no_context,
            schema = %schema,
            "Generated relationship instances"
        );

        Ok(Self { instances })
    }

    /// Load the instance store from cache, or build it (and the tf-idf
    /// model it needs) from the corpus.
    pub fn load_or_build(
        corpus: &Corpus,
        schema: &RelationSchema,
        config: &ExtractionConfig,
        tokenizer: &Tokenizer,
        cache: Option<&ArtifactCache>,
    ) -> Result<Self> {
        let extractor = TaggedSentenceExtractor::new(config.clone())?;
        let inputs = [corpus.fingerprint(), tokenizer.fingerprint()];
        let store_key = ArtifactCache::key(
            "instances",
            &[inputs[0], inputs[1], fingerprint(config), fingerprint(schema)],
        );

        if let Some(store) = cache.and_then(|c| c.load::<Self>(&store_key)) {
            tracing::info!(instances = store.len(), "Loaded processed instances");
            return Ok(store);
        }

        let model_key = ArtifactCache::key("vsm", &inputs);
        let model = match cache.and_then(|c| c.load::<TfIdfModel>(&model_key)) {
            Some(model) => model,
            None => {
                tracing::info!(sentences = corpus.len(), "Generating tf-idf model");
                let model = TfIdfModel::fit(
                    corpus
                        .sentences()
                        .iter()
                        .map(|line| tokenizer.tokenize(&extractor.plain_text(line))),
                );
                if let Some(cache) = cache {
                    if let Err(e) = cache.store(&model_key, &model) {
                        tracing::warn!("Failed to cache tf-idf model: {}", e);
                    }
                }
                model
            }
        };

        let store = Self::build(corpus, schema, &extractor, tokenizer, &model)?;
        if let Some(cache) = cache {
            if let Err(e) = cache.store(&store_key, &store) {
                tracing::warn!("Failed to cache instances: {}", e);
            }
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.0)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Iterate instances with their ids
    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (InstanceId(i), inst))
    }

    pub fn into_instances(self) -> Vec<Instance> {
        self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &[&str] = &[
        "<ORG>Google</ORG> is headquartered in <LOC>Mountain View</LOC> .",
        "<ORG>Apple</ORG> is headquartered in <LOC>Cupertino</LOC> .",
        "<PER>Larry Page</PER> founded <ORG>Google</ORG> .",
        "<ORG>Acme</ORG> in <LOC>Springfield</LOC>",
        "",
        "It rained in <LOC>Paris</LOC> today .",
    ];

    fn schema() -> RelationSchema {
        RelationSchema::new("ORG", "LOC")
    }

    #[test]
    fn test_corpus_skips_blank_lines() {
        let corpus = Corpus::from_lines(CORPUS.iter());
        assert_eq!(corpus.len(), 5);
        assert_eq!(
            corpus.fingerprint(),
            Corpus::from_lines(CORPUS.iter()).fingerprint()
        );
    }

    #[test]
    fn test_build_filters_types_and_empty_contexts() {
        let corpus = Corpus::from_lines(CORPUS.iter());
        let store = InstanceStore::load_or_build(
            &corpus,
            &schema(),
            &ExtractionConfig::default(),
            &Tokenizer::new(),
            None,
        )
        .unwrap();

        // PER-ORG is the wrong type; Acme/Springfield has only "in" as context
        assert_eq!(store.len(), 2);
        let (id, first) = store.iter().next().unwrap();
        assert_eq!(id, InstanceId(0));
        assert_eq!(first.e1, "Google");
        assert_eq!(first.between.tokens, vec!["headquartered"]);
        assert!(first.between.vector.is_some());
        assert_eq!(store.get(InstanceId(1)).unwrap().sentence_id, 1);
    }

    #[test]
    fn test_sentence_id_ignores_blank_lines() {
        let lines = [
            "",
            "<ORG>Acme</ORG> relocated to <LOC>Springfield</LOC> .",
            "   ",
            "<ORG>Initech</ORG> opened offices in <LOC>Austin</LOC> .",
        ];
        let corpus = Corpus::from_lines(lines);
        let store = InstanceStore::load_or_build(
            &corpus,
            &schema(),
            &ExtractionConfig::default(),
            &Tokenizer::new(),
            None,
        )
        .unwrap();

        let ids: Vec<usize> = store.instances().iter().map(|i| i.sentence_id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert!(corpus.sentences()[1].starts_with("<ORG>Initech</ORG>"));
    }

    #[test]
    fn test_load_or_build_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        let corpus = Corpus::from_lines(CORPUS.iter());
        let config = ExtractionConfig::default();
        let tokenizer = Tokenizer::new();

        let built =
            InstanceStore::load_or_build(&corpus, &schema(), &config, &tokenizer, Some(&cache))
                .unwrap();
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);

        let loaded =
            InstanceStore::load_or_build(&corpus, &schema(), &config, &tokenizer, Some(&cache))
                .unwrap();
        assert_eq!(loaded.len(), built.len());
        assert_eq!(loaded.instances()[0].e2, "Mountain View");
    }
}
