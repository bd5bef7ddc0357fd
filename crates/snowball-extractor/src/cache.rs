//! On-disk artifact cache
//!
//! Stores expensive intermediate artifacts (the tf-idf model and the built
//! instance store) as JSON files. Keys embed fingerprints of their inputs,
//! so a changed corpus or extraction config simply misses.
//!
//! Lookups never fail: a missing, unreadable or undecodable entry is a miss.

use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use snowball_core::{Result, SnowballError};

/// Directory-backed JSON artifact cache
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    /// Create a cache rooted at `dir` (created lazily on first store)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a cache key from an artifact name and input fingerprints
    pub fn key(artifact: &str, fingerprints: &[u64]) -> String {
        let mut key = artifact.to_string();
        for fp in fingerprints {
            key.push_str(&format!("-{fp:016x}"));
        }
        key
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up an artifact
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        if !path.is_file() {
            tracing::debug!(key, "Cache miss");
            return None;
        }

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Unreadable cache entry: {}", e);
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => {
                tracing::info!(key, "Loaded artifact from cache");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Undecodable cache entry: {}", e);
                None
            }
        }
    }

    /// Persist an artifact
    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SnowballError::io(&self.dir, e))?;

        let path = self.path_for(key);
        let file = File::create(&path).map_err(|e| SnowballError::io(&path, e))?;
        serde_json::to_writer(BufWriter::new(file), value)
            .map_err(|e| SnowballError::Serialization(e.to_string()))?;

        tracing::info!(key, path = %path.display(), "Stored artifact in cache");
        Ok(())
    }
}

/// Hash any hashable value into a cache fingerprint
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
