// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load + encode the seed examples     (Layer 4 - data)
//   Step 2: Augment them                        (Layer 4 - data)
//   Step 3: Append a mined corpus, if given     (Layer 4 - data)
//   Step 4: Save config                         (Layer 6 - infra)
//   Step 5: Run training loop                   (Layer 5 - ml)
//   Step 6: Evaluate on fixed scenarios         (Layer 5 - ml)
//   Step 7: Write the weights artifact          (Layer 6 - infra)
//
// Any failure before Step 7 leaves no weights.json behind.
//
// Reference: Burn Book §5 (Training)

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::{augmenter::augment, corpus_store::CorpusLoader, seed_loader::SeedLoader};
use crate::domain::traits::ExampleSource;
use crate::infra::{
    metrics::MetricsLogger,
    weight_store::{ModelWeights, WeightStore, ARTIFACT_VERSION},
};
use crate::ml::{
    evaluator::{evaluate, scenarios, EvaluationReport},
    model::EcoScoreConfig,
    trainer::{run_training, TrainingSettings},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved to disk next to the weights so a run can be reproduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub seed_file:           String,
    pub corpus:              Option<String>,
    pub output_dir:          String,
    pub augment_factor:      usize,
    pub epochs:              usize,
    pub batch_size:          usize,
    pub lr:                  f64,
    pub validation_fraction: f64,
    pub rng_seed:            u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed_file:           "data/seed_examples.json".to_string(),
            corpus:              None,
            output_dir:          "model".to_string(),
            augment_factor:      4,
            epochs:              100,
            batch_size:          16,
            lr:                  0.005,
            validation_fraction: 0.2,
            rng_seed:            42,
        }
    }
}

impl TrainConfig {
    fn settings(&self) -> TrainingSettings {
        TrainingSettings {
            epochs:              self.epochs,
            batch_size:          self.batch_size,
            learning_rate:       self.lr,
            validation_fraction: self.validation_fraction,
            ..TrainingSettings::default()
        }
    }
}

/// What a finished training run produced.
pub struct TrainReport {
    pub weights_path:      PathBuf,
    pub training_examples: usize,
    pub evaluation:        EvaluationReport,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.rng_seed);

        // ── Step 1: Seed examples ─────────────────────────────────────────────
        let seed = SeedLoader::new(&cfg.seed_file).load_examples()?;

        // ── Step 2: Augmentation ──────────────────────────────────────────────
        let mut examples = augment(&seed, cfg.augment_factor, &mut rng);
        tracing::info!(
            "{} seed examples augmented to {} (factor {})",
            seed.len(),
            examples.len(),
            cfg.augment_factor
        );

        // ── Step 3: Mined corpus ──────────────────────────────────────────────
        if let Some(corpus) = &cfg.corpus {
            let mined = CorpusLoader::new(corpus).load_examples()?;
            tracing::info!("Added {} mined products from '{}'", mined.len(), corpus);
            examples.extend(mined);
        }

        // ── Step 4: Save config ───────────────────────────────────────────────
        let store = WeightStore::new(&cfg.output_dir);
        store.save_config(cfg)?;
        let metrics = MetricsLogger::new(store.dir())?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let model_cfg = EcoScoreConfig::new();
        let outcome = run_training(&model_cfg, &cfg.settings(), &examples, &mut rng, Some(&metrics))
            .context("Training failed")?;

        // ── Step 6: Evaluate ──────────────────────────────────────────────────
        if let Some(last) = outcome.final_metrics() {
            tracing::info!(
                "Final losses: train={:.6} val={:.6} (history in '{}')",
                last.train_loss,
                last.val_loss,
                metrics.csv_path().display()
            );
        }
        let evaluation = evaluate(&outcome.model, &scenarios(), &outcome.device)?;
        tracing::info!("Scenario MAE: {:.2} points", evaluation.mae);

        // ── Step 7: Weights artifact ──────────────────────────────────────────
        let weights = ModelWeights {
            version:           ARTIFACT_VERSION.to_string(),
            architecture:      model_cfg.descriptor(),
            total_parameters:  model_cfg.parameter_count(),
            training_examples: examples.len(),
            epochs:            cfg.epochs,
            final_mae:         evaluation.mae,
            trained_at:        chrono::Utc::now().to_rfc3339(),
            weights:           outcome.model.to_layer_tensors()?,
        };
        let weights_path = store.save_weights(&weights)?;

        Ok(TrainReport {
            weights_path,
            training_examples: examples.len(),
            evaluation,
        })
    }
}
