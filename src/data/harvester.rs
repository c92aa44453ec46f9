// ============================================================
// Layer 4: Harvester (Pagination Driver + Dedup)
// ============================================================
// Walks catalog pages 1..=max_pages one at a time:
//
//   Fetching ──▶ PageEmpty ──(3 in a row)──▶ Stopped
//      │  ▲          │
//      │  └──────────┘ (next page)
//      ▼
//   PageValid ──(target reached)──▶ Stopped
//
// Per page:
//   1. fetch (retries live inside the CatalogSource)
//   2. validate / project every record (data::extractor)
//   3. fold into the CorpusAccumulator, skipping seen codes
//   4. report a PageProgress snapshot to the caller
//   5. sleep the politeness delay before the next request
//
// A page whose retries are exhausted is logged and skipped;
// it neither stops the run nor counts as an empty page.
//
// All running state (seen codes, products, grade counts) is
// owned by the accumulator that lives inside `run`.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use crate::data::extractor::{extract_page, ExtractOptions};
use crate::domain::product::{CanonicalProduct, GradeHistogram};
use crate::domain::traits::CatalogSource;

/// Consecutive empty pages that end a run.
pub const MAX_CONSECUTIVE_EMPTY: u32 = 3;

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub max_pages:        u32,
    pub target_products:  usize,
    pub politeness_delay: Duration,
    pub extract:          ExtractOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestState {
    Fetching,
    PageEmpty,
    PageValid,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    PageLimit,
    EmptyPages,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TargetReached => f.write_str("target reached"),
            StopReason::PageLimit => f.write_str("page limit reached"),
            StopReason::EmptyPages => {
                write!(f, "{} consecutive empty pages", MAX_CONSECUTIVE_EMPTY)
            }
        }
    }
}

// ─── PageProgress ─────────────────────────────────────────────────────────────
/// Snapshot emitted after every page, successful or not.
#[derive(Debug, Clone)]
pub struct PageProgress {
    pub page:      u32,
    pub state:     HarvestState,
    /// Raw records on the page
    pub attempted: usize,
    /// Records that passed validation
    pub valid:     usize,
    /// Valid records that were new (not duplicates) and fit under the target
    pub added:     usize,
    pub total:     usize,
    pub target:    usize,
    pub grades:    GradeHistogram,
    /// True when the page was skipped after exhausting retries
    pub failed:    bool,
}

impl PageProgress {
    /// Valid / attempted for this page, in [0, 1].
    pub fn yield_ratio(&self) -> f64 {
        if self.attempted == 0 { 0.0 } else { self.valid as f64 / self.attempted as f64 }
    }
}

// ─── CorpusAccumulator ────────────────────────────────────────────────────────
/// Append-only product list keyed by `code`.
#[derive(Debug, Default)]
pub struct CorpusAccumulator {
    seen:     HashSet<String>,
    products: Vec<CanonicalProduct>,
    grades:   GradeHistogram,
    scanned:  usize,
}

impl CorpusAccumulator {
    /// Fold one page in. Returns how many products were appended.
    /// Stops appending as soon as `limit` products are held.
    pub fn absorb(
        &mut self,
        attempted: usize,
        products:  Vec<CanonicalProduct>,
        limit:     usize,
    ) -> usize {
        self.scanned += attempted;
        let mut added = 0;
        for product in products {
            if self.products.len() >= limit {
                break;
            }
            if !self.seen.insert(product.code.clone()) {
                tracing::trace!("duplicate code {}", product.code);
                continue;
            }
            self.grades.record(product.ecoscore_grade);
            self.products.push(product);
            added += 1;
        }
        added
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn grades(&self) -> GradeHistogram {
        self.grades
    }

    pub fn scanned(&self) -> usize {
        self.scanned
    }

    pub fn into_products(self) -> Vec<CanonicalProduct> {
        self.products
    }
}

// ─── HarvestOutcome ───────────────────────────────────────────────────────────
#[derive(Debug)]
pub struct HarvestOutcome {
    pub products:      Vec<CanonicalProduct>,
    pub total_scanned: usize,
    pub pages_fetched: u32,
    pub pages_failed:  u32,
    pub stop_reason:   StopReason,
}

// ─── Harvester ────────────────────────────────────────────────────────────────
pub struct Harvester<S: CatalogSource> {
    source:   S,
    settings: HarvestSettings,
}

impl<S: CatalogSource> Harvester<S> {
    pub fn new(source: S, settings: HarvestSettings) -> Self {
        Self { source, settings }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the page loop to completion, calling `on_progress` after each page.
    pub fn run<F>(&self, mut on_progress: F) -> HarvestOutcome
    where
        F: FnMut(&PageProgress),
    {
        let cfg = &self.settings;
        let mut acc = CorpusAccumulator::default();
        let mut consecutive_empty = 0u32;
        let mut pages_fetched = 0u32;
        let mut pages_failed = 0u32;
        let mut page = 1u32;

        let stop_reason = loop {
            if acc.len() >= cfg.target_products {
                break StopReason::TargetReached;
            }
            if page > cfg.max_pages {
                break StopReason::PageLimit;
            }

            let mut progress = PageProgress {
                page,
                state: HarvestState::Fetching,
                attempted: 0,
                valid: 0,
                added: 0,
                total: acc.len(),
                target: cfg.target_products,
                grades: acc.grades(),
                failed: false,
            };

            match self.source.fetch_page(page) {
                Ok(records) if records.is_empty() => {
                    pages_fetched += 1;
                    consecutive_empty += 1;
                    progress.state = HarvestState::PageEmpty;
                    tracing::info!(
                        "Page {} empty ({}/{} in a row)",
                        page, consecutive_empty, MAX_CONSECUTIVE_EMPTY
                    );
                }
                Ok(records) => {
                    pages_fetched += 1;
                    consecutive_empty = 0;
                    let valid = extract_page(&records, cfg.extract);
                    progress.attempted = records.len();
                    progress.valid = valid.len();
                    progress.added = acc.absorb(records.len(), valid, cfg.target_products);
                    progress.state = HarvestState::PageValid;
                }
                Err(err) => {
                    pages_failed += 1;
                    progress.failed = true;
                    tracing::warn!("Skipping page {}: {}", page, err);
                }
            }

            progress.total = acc.len();
            progress.grades = acc.grades();
            on_progress(&progress);

            if consecutive_empty >= MAX_CONSECUTIVE_EMPTY {
                break StopReason::EmptyPages;
            }

            page += 1;
            if acc.len() < cfg.target_products && page <= cfg.max_pages {
                thread::sleep(cfg.politeness_delay);
            }
        };

        tracing::info!(
            "Harvest {:?}: {} ({} products from {} scanned records)",
            HarvestState::Stopped, stop_reason, acc.len(), acc.scanned()
        );

        HarvestOutcome {
            total_scanned: acc.scanned(),
            products: acc.into_products(),
            pages_fetched,
            pages_failed,
            stop_reason,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use serde_json::json;

    use crate::domain::product::{CatalogRecord, Grade};
    use crate::domain::traits::FetchError;

    /// In-memory catalog: scripted pages, anything unscripted is empty.
    #[derive(Default)]
    struct FakeCatalog {
        pages:     HashMap<u32, Result<Vec<CatalogRecord>, ()>>,
        requested: RefCell<Vec<u32>>,
    }

    impl FakeCatalog {
        fn page(mut self, n: u32, records: Vec<CatalogRecord>) -> Self {
            self.pages.insert(n, Ok(records));
            self
        }

        fn failing(mut self, n: u32) -> Self {
            self.pages.insert(n, Err(()));
            self
        }
    }

    impl CatalogSource for FakeCatalog {
        fn fetch_page(&self, page: u32) -> Result<Vec<CatalogRecord>, FetchError> {
            self.requested.borrow_mut().push(page);
            match self.pages.get(&page) {
                Some(Ok(records)) => Ok(records.clone()),
                Some(Err(())) => Err(FetchError::Timeout { url: format!("fake://{page}") }),
                None => Ok(Vec::new()),
            }
        }

        fn describe(&self) -> String {
            "fake".into()
        }
    }

    fn product(code: &str, grade: &str, score: f64) -> CatalogRecord {
        CatalogRecord::from_value(json!({
            "code": code,
            "product_name": format!("Product {code}"),
            "categories_tags": ["en:snacks"],
            "ecoscore_grade": grade,
            "ecoscore_score": score,
        }))
    }

    fn invalid(code: &str) -> CatalogRecord {
        CatalogRecord::from_value(json!({"code": code, "product_name": "No grade"}))
    }

    fn settings(max_pages: u32, target: usize) -> HarvestSettings {
        HarvestSettings {
            max_pages,
            target_products: target,
            politeness_delay: Duration::ZERO,
            extract: ExtractOptions::default(),
        }
    }

    #[test]
    fn test_always_empty_feed_stops_after_three_pages() {
        let harvester = Harvester::new(FakeCatalog::default(), settings(5, 100));
        let mut snapshots = Vec::new();
        let outcome = harvester.run(|p| snapshots.push(p.clone()));

        assert_eq!(outcome.stop_reason, StopReason::EmptyPages);
        assert_eq!(*harvester.source().requested.borrow(), vec![1, 2, 3]);
        assert!(outcome.products.is_empty());
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots.iter().all(|p| p.state == HarvestState::PageEmpty));
    }

    #[test]
    fn test_overlapping_pages_keep_each_code_once() {
        let feed = FakeCatalog::default()
            .page(1, vec![product("1", "a", 90.0), product("2", "b", 70.0)])
            .page(2, vec![product("2", "b", 70.0), product("3", "e", 5.0), product("1", "a", 90.0)]);
        let outcome = Harvester::new(feed, settings(2, 100)).run(|_| {});

        let codes: Vec<&str> = outcome.products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2", "3"]);
        assert_eq!(outcome.total_scanned, 5);
        assert_eq!(outcome.stop_reason, StopReason::PageLimit);
    }

    #[test]
    fn test_non_empty_page_resets_empty_counter() {
        // empty, empty, data, empty, empty, empty → stops on page 6
        let feed = FakeCatalog::default().page(3, vec![product("9", "c", 50.0)]);
        let harvester = Harvester::new(feed, settings(10, 100));
        let outcome = harvester.run(|_| {});

        assert_eq!(outcome.stop_reason, StopReason::EmptyPages);
        assert_eq!(*harvester.source().requested.borrow(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(outcome.products.len(), 1);
    }

    #[test]
    fn test_page_with_only_invalid_records_is_not_empty() {
        let feed = FakeCatalog::default()
            .page(1, vec![invalid("x")])
            .page(2, vec![invalid("y")]);
        let mut yields = Vec::new();
        let outcome = Harvester::new(feed, settings(2, 100)).run(|p| yields.push(p.yield_ratio()));

        assert_eq!(outcome.stop_reason, StopReason::PageLimit);
        assert_eq!(outcome.total_scanned, 2);
        assert_eq!(yields, vec![0.0, 0.0]);
    }

    #[test]
    fn test_stops_at_target_and_truncates() {
        let feed = FakeCatalog::default()
            .page(1, vec![product("1", "a", 90.0), product("2", "a", 85.0)])
            .page(2, vec![product("3", "b", 65.0), product("4", "c", 45.0)])
            .page(3, vec![product("5", "d", 25.0)]);
        let harvester = Harvester::new(feed, settings(10, 3));
        let outcome = harvester.run(|_| {});

        assert_eq!(outcome.stop_reason, StopReason::TargetReached);
        assert_eq!(outcome.products.len(), 3);
        assert_eq!(*harvester.source().requested.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_failed_page_is_skipped_and_run_continues() {
        let feed = FakeCatalog::default()
            .page(1, vec![product("1", "a", 90.0)])
            .failing(2)
            .page(3, vec![product("3", "d", 30.0)]);
        let mut failed_pages = Vec::new();
        let outcome = Harvester::new(feed, settings(3, 100)).run(|p| {
            if p.failed {
                failed_pages.push(p.page);
            }
        });

        assert_eq!(failed_pages, vec![2]);
        assert_eq!(outcome.pages_failed, 1);
        assert_eq!(outcome.pages_fetched, 2);
        assert_eq!(outcome.products.len(), 2);
    }

    #[test]
    fn test_progress_tracks_running_grades() {
        let feed = FakeCatalog::default()
            .page(1, vec![product("1", "A", 90.0), product("2", "e", 3.0), invalid("z")]);
        let mut last = None;
        Harvester::new(feed, settings(1, 100)).run(|p| last = Some(p.clone()));

        let p = last.unwrap();
        assert_eq!(p.attempted, 3);
        assert_eq!(p.valid, 2);
        assert_eq!(p.total, 2);
        assert_eq!(p.grades.count(Grade::A), 1);
        assert_eq!(p.grades.count(Grade::E), 1);
    }
}
