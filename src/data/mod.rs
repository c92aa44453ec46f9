// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything between the remote catalog and tensor batches.
//
// Mining flows in this order:
//
//   remote catalog (HTTP, paginated)
//       │
//       ▼
//   CatalogClient   → one page of raw records, with retries
//       │
//       ▼
//   Extractor       → drops invalid records, builds CanonicalProducts
//       │
//       ▼
//   Harvester       → dedups, counts, decides when to stop
//       │
//       ▼
//   CorpusWriter    → training_corpus.json
//
// Training flows in this order:
//
//   seed_examples.json (+ optional mined corpus)
//       │
//       ▼
//   SeedLoader / CorpusLoader → Encoder → LabeledExamples
//       │
//       ▼
//   Augmenter → Splitter (per epoch) → EcoBatcher → model
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Jittered copies of the seed set
pub mod augmenter;

/// Stacks examples into tensor batches
pub mod batcher;

/// HTTP access to the product catalog search endpoint
pub mod catalog_client;

/// Writes the mined corpus, reads it back for training
pub mod corpus_store;

/// The shared 12-feature encoding
pub mod encoder;

/// Record validation and projection
pub mod extractor;

/// Paginated, deduplicating harvest driver
pub mod harvester;

/// Retry wrapper with linear backoff
pub mod retry;

/// Hand-labeled seed dataset file
pub mod seed_loader;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
