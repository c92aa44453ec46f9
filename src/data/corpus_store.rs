// ============================================================
// Layer 4: Corpus Store (Dataset Writer + Loader)
// ============================================================
// Writes the finished TrainingCorpus as pretty-printed JSON,
// creating the destination directory first. Any failure here
// is fatal for the mining run: there is no point finishing a
// harvest whose result cannot be saved.
//
// The loader side reads a corpus back for `train --corpus`,
// encoding each product into a LabeledExample.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::encoder::{encode_product, OriginPolicy};
use crate::domain::corpus::TrainingCorpus;
use crate::domain::example::LabeledExample;
use crate::domain::traits::ExampleSource;

// ─── CorpusWriter ─────────────────────────────────────────────────────────────
pub struct CorpusWriter {
    path: PathBuf,
}

impl CorpusWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, corpus: &TrainingCorpus) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(corpus)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write corpus to '{}'", self.path.display()))?;

        tracing::info!(
            "Wrote {} products to '{}'",
            corpus.total_products,
            self.path.display()
        );
        Ok(())
    }
}

// ─── CorpusLoader ─────────────────────────────────────────────────────────────
pub struct CorpusLoader {
    path:    PathBuf,
    origins: OriginPolicy,
}

impl CorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), origins: OriginPolicy::default() }
    }

    pub fn load(&self) -> Result<TrainingCorpus> {
        let json = fs::read_to_string(&self.path).with_context(|| {
            format!(
                "Cannot read corpus '{}'. Run 'mine' first or drop --corpus.",
                self.path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid corpus file", self.path.display()))
    }
}

impl ExampleSource for CorpusLoader {
    fn load_examples(&self) -> Result<Vec<LabeledExample>> {
        let corpus = self.load()?;
        tracing::info!(
            "Corpus '{}' fetched {} from {}",
            self.path.display(),
            corpus.fetched_at,
            corpus.source
        );
        Ok(corpus
            .products
            .iter()
            .map(|p| encode_product(p, &self.origins))
            .collect())
    }
}
