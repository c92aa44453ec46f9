// ============================================================
// Layer 4: Seed Dataset Loader
// ============================================================
// Reads the hand-labeled seed file:
//
//   {
//     "version":     "1.0.0",
//     "description": "...",
//     "examples":    [ { "category": "meats", "nova": 4, ..., "score": 12 } ]
//   }
//
// A missing file, malformed JSON, an unknown category name or
// an empty example list all stop training. Training on nothing
// (or on a half-understood file) is never what the user wants.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::encoder::encode_seed;
use crate::domain::example::{LabeledExample, SeedExample};
use crate::domain::traits::ExampleSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDataset {
    pub version:     String,
    #[serde(default)]
    pub description: String,
    pub examples:    Vec<SeedExample>,
}

pub struct SeedLoader {
    path: PathBuf,
}

impl SeedLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<SeedDataset> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read seed file '{}'", self.path.display()))?;

        let dataset: SeedDataset = serde_json::from_str(&json)
            .with_context(|| format!("Malformed seed file '{}'", self.path.display()))?;

        if dataset.examples.is_empty() {
            bail!("Seed file '{}' contains no examples", self.path.display());
        }

        tracing::info!(
            "Loaded {} seed examples (v{}) from '{}'",
            dataset.examples.len(),
            dataset.version,
            self.path.display()
        );
        Ok(dataset)
    }
}

impl ExampleSource for SeedLoader {
    fn load_examples(&self) -> Result<Vec<LabeledExample>> {
        Ok(self.load()?.examples.iter().map(encode_seed).collect())
    }
}
