//! Seed file parsing
//!
//! A seed file declares the relation's argument types and the initial
//! seed pairs:
//!
//! ```text
//! e1:ORG
//! e2:LOC
//! Google;Mountain View
//! Microsoft;Redmond
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::{RelationSchema, Seed};

/// Parsed seed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFile {
    /// Argument types of the relation
    pub schema: RelationSchema,

    /// Initial seed pairs
    pub seeds: BTreeSet<Seed>,
}

impl SeedFile {
    /// Read and parse a seed file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse seed file content.
    ///
    /// Blank lines and `#` comments are ignored; lines that are neither a
    /// type declaration nor an `e1;e2` pair of two non-empty fields are
    /// skipped with a warning.
    /// Both argument types must be declared.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut e1_type = None;
        let mut e2_type = None;
        let mut seeds = BTreeSet::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(t) = line.strip_prefix("e1:") {
                e1_type = Some(t.trim().to_string());
            } else if let Some(t) = line.strip_prefix("e2:") {
                e2_type = Some(t.trim().to_string());
            } else if line.contains(';') {
                let fields: Vec<&str> = line.split(';').map(str::trim).collect();
                match fields.as_slice() {
                    [e1, e2] if !e1.is_empty() && !e2.is_empty() => {
                        seeds.insert(Seed::new(*e1, *e2));
                    }
                    _ => {
                        tracing::warn!(line = lineno + 1, content = line, "Skipping malformed seed pair");
                    }
                }
            } else {
                tracing::warn!(line = lineno + 1, content = line, "Skipping malformed seed line");
            }
        }

        let e1_type = e1_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("e1 type (e1:<TYPE>)".to_string()))?;
        let e2_type = e2_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("e2 type (e2:<TYPE>)".to_string()))?;

        Ok(Self {
            schema: RelationSchema::new(e1_type, e2_type),
            seeds,
        })
    }
}
