// ============================================================
// Layer 2: MineUseCase
// ============================================================
// Orchestrates the mining pipeline in order:
//
//   Step 1: Build the catalog client      (Layer 4 - data)
//   Step 2: Harvest pages until a stop    (Layer 4 - data)
//   Step 3: Assemble the corpus           (Layer 3 - domain)
//   Step 4: Write training_corpus.json    (Layer 4 - data)
//
// Stopping early on empty pages is a normal outcome and the
// corpus is still written. A run where every page request
// failed is not: there is nothing trustworthy to write.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    catalog_client::{CatalogClient, CatalogQuery},
    corpus_store::CorpusWriter,
    extractor::ExtractOptions,
    harvester::{HarvestSettings, Harvester, PageProgress, StopReason},
    retry::RetryPolicy,
};
use crate::domain::corpus::TrainingCorpus;
use crate::domain::traits::CatalogSource;

/// Pipeline tag written into every corpus.
pub const PIPELINE: &str = "v2-popularity";

// ─── Mining Configuration ────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MineConfig {
    pub base_url:            String,
    pub page_size:           u32,
    pub max_pages:           u32,
    pub target_products:     usize,
    pub timeout_secs:        u64,
    pub max_retries:         u32,
    pub retry_backoff_secs:  u64,
    pub politeness_delay_ms: u64,
    pub fill_missing_scores: bool,
    pub output:              String,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            base_url:            "https://world.openfoodfacts.org".to_string(),
            page_size:           100,
            max_pages:           200,
            target_products:     10_000,
            timeout_secs:        30,
            max_retries:         3,
            retry_backoff_secs:  2,
            politeness_delay_ms: 1000,
            fill_missing_scores: false,
            output:              "data/training_corpus.json".to_string(),
        }
    }
}

impl MineConfig {
    fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            max_pages:        self.max_pages,
            target_products:  self.target_products,
            politeness_delay: Duration::from_millis(self.politeness_delay_ms),
            extract:          ExtractOptions { fill_missing_scores: self.fill_missing_scores },
        }
    }
}

/// What a finished mining run produced.
#[derive(Debug)]
pub struct MineReport {
    pub corpus:        TrainingCorpus,
    pub output:        PathBuf,
    pub pages_fetched: u32,
    pub pages_failed:  u32,
    pub stop_reason:   StopReason,
}

impl MineReport {
    /// Kept products as a percentage of scanned records.
    pub fn yield_percent(&self) -> f64 {
        if self.corpus.total_scanned == 0 {
            0.0
        } else {
            self.corpus.total_products as f64 * 100.0 / self.corpus.total_scanned as f64
        }
    }
}

// ─── MineUseCase ──────────────────────────────────────────────────────────────
pub struct MineUseCase {
    config: MineConfig,
}

impl MineUseCase {
    pub fn new(config: MineConfig) -> Self {
        Self { config }
    }

    /// Mine the live catalog.
    pub fn execute<F>(&self, on_progress: F) -> Result<MineReport>
    where
        F: FnMut(&PageProgress),
    {
        let cfg = &self.config;

        // ── Step 1: Build the catalog client ─────────────────────────────────
        let client = CatalogClient::new(
            CatalogQuery::new(&cfg.base_url, cfg.page_size),
            Duration::from_secs(cfg.timeout_secs),
            RetryPolicy::new(cfg.max_retries, Duration::from_secs(cfg.retry_backoff_secs)),
        )?;

        self.execute_with(client, on_progress)
    }

    /// Mine any catalog source. Steps 2-4.
    pub fn execute_with<S, F>(&self, source: S, on_progress: F) -> Result<MineReport>
    where
        S: CatalogSource,
        F: FnMut(&PageProgress),
    {
        let cfg = &self.config;

        // ── Step 2: Harvest ──────────────────────────────────────────────────
        let source_name = source.describe();
        tracing::info!(
            "Mining {} (target {} products, at most {} pages)",
            source_name, cfg.target_products, cfg.max_pages
        );
        let outcome = Harvester::new(source, cfg.harvest_settings()).run(on_progress);

        if outcome.pages_fetched == 0 && outcome.pages_failed > 0 {
            bail!(
                "All {} page requests to {} failed; nothing was written",
                outcome.pages_failed,
                source_name
            );
        }

        // ── Step 3: Assemble the corpus ──────────────────────────────────────
        let corpus = TrainingCorpus::assemble(
            outcome.products,
            outcome.total_scanned,
            source_name,
            PIPELINE,
            chrono::Utc::now().to_rfc3339(),
        );

        // ── Step 4: Write it ─────────────────────────────────────────────────
        let writer = CorpusWriter::new(&cfg.output);
        writer.write(&corpus)?;

        Ok(MineReport {
            corpus,
            output:        writer.path().to_path_buf(),
            pages_fetched: outcome.pages_fetched,
            pages_failed:  outcome.pages_failed,
            stop_reason:   outcome.stop_reason,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{CatalogRecord, Grade};
    use crate::domain::traits::FetchError;
    use serde_json::json;

    struct ScriptedCatalog {
        pages: Vec<Result<Vec<serde_json::Value>, ()>>,
    }

    impl CatalogSource for ScriptedCatalog {
        fn fetch_page(&self, page: u32) -> Result<Vec<CatalogRecord>, FetchError> {
            match self.pages.get(page as usize - 1) {
                Some(Ok(values)) => {
                    Ok(values.iter().cloned().map(CatalogRecord::from_value).collect())
                }
                Some(Err(())) => Err(FetchError::Timeout { url: format!("fake://{page}") }),
                None => Ok(Vec::new()),
            }
        }

        fn describe(&self) -> String {
            "fake://catalog".to_string()
        }
    }

    fn record(code: &str, grade: &str, score: f64) -> serde_json::Value {
        json!({
            "code": code,
            "product_name": format!("Product {code}"),
            "categories_tags": ["en:snacks"],
            "ecoscore_grade": grade,
            "ecoscore_score": score,
        })
    }

    fn config(dir: &tempfile::TempDir) -> MineConfig {
        MineConfig {
            max_pages:           5,
            target_products:     100,
            politeness_delay_ms: 0,
            output:              dir.path().join("out/corpus.json").display().to_string(),
            ..MineConfig::default()
        }
    }

    #[test]
    fn test_early_stop_still_writes_corpus() {
        let tmp = tempfile::tempdir().unwrap();
        let source = ScriptedCatalog {
            pages: vec![
                Ok(vec![record("1", "a", 90.0), record("2", "e", 5.0), json!({"code": "3"})]),
                Ok(vec![record("1", "a", 90.0), record("4", "c", 50.0)]),
            ],
        };

        let mut seen_pages = Vec::new();
        let report = MineUseCase::new(config(&tmp))
            .execute_with(source, |p| seen_pages.push(p.page))
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::EmptyPages);
        assert_eq!(seen_pages, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.corpus.total_products, 3);
        assert_eq!(report.corpus.total_scanned, 5);
        assert_eq!(report.corpus.grade_distribution.count(Grade::A), 1);
        assert_eq!(report.corpus.pipeline, PIPELINE);
        assert!((report.yield_percent() - 60.0).abs() < 1e-9);
        assert!(report.output.exists());
    }

    #[test]
    fn test_all_pages_failing_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let source = ScriptedCatalog { pages: vec![Err(()); 5] };
        let cfg = config(&tmp);
        let output = PathBuf::from(&cfg.output);

        let err = MineUseCase::new(cfg).execute_with(source, |_| {}).unwrap_err();
        assert!(err.to_string().contains("failed"));
        assert!(!output.exists());
    }

    #[test]
    fn test_config_defaults() {
        let cfg = MineConfig::default();
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.max_pages, 200);
        assert_eq!(cfg.target_products, 10_000);
        assert!(!cfg.fill_missing_scores);
    }
}
