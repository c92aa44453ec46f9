// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `mine`, `train` and `predict`
// and all their configurable flags. Every flag of `mine` and
// `train` has a default, so both run with no arguments.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, Category, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::mine_use_case::MineConfig;
use crate::application::train_use_case::TrainConfig;
use crate::domain::category::Category;
use crate::domain::example::ProductSignals;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine eco-scored products from the catalog into a training corpus
    Mine(MineArgs),

    /// Train the eco-score network and write model/weights.json
    Train(TrainArgs),

    /// Score one product with a trained model
    Predict(PredictArgs),
}

// ─── mine ─────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct MineArgs {
    /// Catalog base URL
    #[arg(long, default_value = "https://world.openfoodfacts.org")]
    pub base_url: String,

    /// Records requested per page
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Hard cap on pages requested
    #[arg(long, default_value_t = 200)]
    pub max_pages: u32,

    /// Stop once this many unique valid products are collected
    #[arg(long, default_value_t = 10_000)]
    pub target: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Attempts per page before it is skipped
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Backoff base in seconds; attempt n waits n × base
    #[arg(long, default_value_t = 2)]
    pub backoff_secs: u64,

    /// Pause between pages in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Keep records that have a grade but no numeric score,
    /// using a fixed score per grade
    #[arg(long)]
    pub fill_missing_scores: bool,

    /// Corpus output file
    #[arg(long, default_value = "data/training_corpus.json")]
    pub output: String,
}

impl From<MineArgs> for MineConfig {
    fn from(a: MineArgs) -> Self {
        MineConfig {
            base_url:            a.base_url,
            page_size:           a.page_size,
            max_pages:           a.max_pages,
            target_products:     a.target,
            timeout_secs:        a.timeout_secs,
            max_retries:         a.retries,
            retry_backoff_secs:  a.backoff_secs,
            politeness_delay_ms: a.delay_ms,
            fill_missing_scores: a.fill_missing_scores,
            output:              a.output,
        }
    }
}

// ─── train ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Hand-labeled seed dataset
    #[arg(long, default_value = "data/seed_examples.json")]
    pub seed_file: String,

    /// Mined corpus to add to the seed set (optional)
    #[arg(long)]
    pub corpus: Option<String>,

    /// Directory for weights.json, train_config.json and metrics.csv
    #[arg(long, default_value = "model")]
    pub output_dir: String,

    /// Noisy copies made of each seed example
    #[arg(long, default_value_t = 4)]
    pub augment_factor: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Examples per gradient step
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.005)]
    pub lr: f64,

    /// Share of examples held out for validation each epoch
    #[arg(long, default_value_t = 0.2)]
    pub validation_fraction: f64,

    /// Seed for augmentation noise and data splits
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            seed_file:           a.seed_file,
            corpus:              a.corpus,
            output_dir:          a.output_dir,
            augment_factor:      a.augment_factor,
            epochs:              a.epochs,
            batch_size:          a.batch_size,
            lr:                  a.lr,
            validation_fraction: a.validation_fraction,
            rng_seed:            a.seed,
        }
    }
}

// ─── predict ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Product category, e.g. fruits-and-vegetables, meats, dairy
    #[arg(long)]
    pub category: Category,

    /// NOVA group, 1 (unprocessed) to 4 (ultra-processed)
    #[arg(long, default_value_t = 3)]
    pub nova: u8,

    #[arg(long)]
    pub organic: bool,

    #[arg(long)]
    pub fairtrade: bool,

    /// Carries a recognised eco-certification label
    #[arg(long)]
    pub eco_cert: bool,

    #[arg(long)]
    pub recyclable: bool,

    #[arg(long)]
    pub glass: bool,

    #[arg(long)]
    pub plastic: bool,

    /// Produced locally
    #[arg(long)]
    pub local: bool,

    /// Imported from far away
    #[arg(long)]
    pub far: bool,

    /// Number of sustainability certifications
    #[arg(long, default_value_t = 0)]
    pub cert_count: u32,

    /// Processing level in [0, 1]; derived from --nova when omitted
    #[arg(long)]
    pub processing: Option<f32>,

    /// Directory containing weights.json
    #[arg(long, default_value = "model")]
    pub model_dir: String,
}

impl From<&PredictArgs> for ProductSignals {
    fn from(a: &PredictArgs) -> Self {
        let nova = a.nova.clamp(1, 4);
        ProductSignals {
            category:   a.category,
            nova:       a.nova,
            organic:    a.organic,
            fairtrade:  a.fairtrade,
            eco_cert:   a.eco_cert,
            recyclable: a.recyclable,
            glass:      a.glass,
            plastic:    a.plastic,
            local:      a.local,
            far:        a.far,
            cert_count: a.cert_count,
            processing: a.processing.unwrap_or((nova - 1) as f32 / 3.0),
        }
    }
}
