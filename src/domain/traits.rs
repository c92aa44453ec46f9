// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The two seams the application layer programs against:
//
//   CatalogSource  → one page of raw catalog records
//                    (HTTP client in production, in-memory
//                    feeds in tests)
//   ExampleSource  → labeled training examples
//                    (seed dataset file, mined corpus file)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use thiserror::Error;

use crate::domain::example::LabeledExample;
use crate::domain::product::CatalogRecord;

// ─── FetchError ───────────────────────────────────────────────────────────────
/// Why a single page request failed. Every variant is treated as
/// transient: the retry wrapper tries again, and once retries are
/// exhausted the harvester skips the page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

// ─── CatalogSource ────────────────────────────────────────────────────────────
/// Anything that can hand out catalog pages by number (1-based).
///
/// An empty Vec means "no more data on this page".
pub trait CatalogSource {
    fn fetch_page(&self, page: u32) -> Result<Vec<CatalogRecord>, FetchError>;

    /// Human-readable identifier recorded in the corpus metadata.
    fn describe(&self) -> String;
}

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce labeled training examples.
///
/// Implementations:
///   - SeedLoader   → hand-labeled seed dataset (JSON resource)
///   - CorpusLoader → products mined by the `mine` command
pub trait ExampleSource {
    fn load_examples(&self) -> Result<Vec<LabeledExample>>;
}
