// ============================================================
// Layer 5: Training Loop
// ============================================================
// Mini-batch Adam on MSE, with a fresh train/validation split
// every epoch.
//
// Key Burn 0.20 insight:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - Validation batcher must also use EvalBackend
//
// There is no early stopping and no checkpointing mid-run:
// either all epochs finish and the caller gets a model, or the
// run fails and nothing is written.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use rand::Rng;

use crate::data::{batcher::EcoBatcher, splitter::split_train_val};
use crate::domain::example::LabeledExample;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{EcoScoreConfig, EcoScoreModel};

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend  = NdArray;

#[derive(Debug, Clone)]
pub struct TrainingSettings {
    pub epochs:              usize,
    pub batch_size:          usize,
    pub learning_rate:       f64,
    pub validation_fraction: f64,
    /// Print and log a metrics row every N epochs (and after the last)
    pub report_every:        usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epochs:              100,
            batch_size:          16,
            learning_rate:       0.005,
            validation_fraction: 0.2,
            report_every:        10,
        }
    }
}

pub struct TrainingOutcome {
    pub model:   EcoScoreModel<EvalBackend>,
    pub device:  NdArrayDevice,
    /// One entry per progress report
    pub history: Vec<EpochMetrics>,
}

impl TrainingOutcome {
    pub fn final_metrics(&self) -> Option<&EpochMetrics> {
        self.history.last()
    }
}

pub fn run_training<R: Rng + ?Sized>(
    model_cfg: &EcoScoreConfig,
    settings:  &TrainingSettings,
    examples:  &[LabeledExample],
    rng:       &mut R,
    metrics:   Option<&MetricsLogger>,
) -> Result<TrainingOutcome> {
    if examples.is_empty() {
        bail!("No training examples");
    }
    if !(0.0..1.0).contains(&settings.validation_fraction) {
        bail!(
            "Validation fraction must be in [0, 1), got {}",
            settings.validation_fraction
        );
    }
    if settings.epochs == 0 {
        bail!("Epoch count must be at least 1");
    }
    let train_rows = (examples.len() as f64 * (1.0 - settings.validation_fraction)).round() as usize;
    if train_rows == 0 {
        bail!(
            "{} examples with validation fraction {} leave no training rows",
            examples.len(),
            settings.validation_fraction
        );
    }

    let device = NdArrayDevice::default();

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: EcoScoreModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} ({} parameters)",
        model_cfg.descriptor(),
        model_cfg.parameter_count()
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let train_batcher = EcoBatcher::<TrainBackend>::new(device.clone());
    let val_batcher   = EcoBatcher::<EvalBackend>::new(device.clone());
    let report_every  = settings.report_every.max(1);
    let mut history   = Vec::new();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=settings.epochs {
        let (train_set, val_set) =
            split_train_val(examples.to_vec(), 1.0 - settings.validation_fraction, rng);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_batcher.batches(&train_set, settings.batch_size) {
            let loss = model.forward_loss(batch.features, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                bail!("Training diverged at epoch {epoch}: loss = {loss_val}");
            }
            train_loss_sum += loss_val;
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(settings.learning_rate, model, grads);
        }

        if train_batches == 0 {
            bail!("Epoch {epoch} ran no training batches");
        }
        let avg_train_loss = train_loss_sum / train_batches as f64;

        if epoch % report_every != 0 && epoch != settings.epochs {
            continue;
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_batcher.batches(&val_set, settings.batch_size) {
            let loss = model_valid.forward_loss(batch.features, batch.targets);
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6}",
            epoch, settings.epochs, avg_train_loss, avg_val_loss,
        );

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss);
        if row.is_overfitting(0.5) {
            tracing::warn!("Epoch {epoch}: validation loss is well above training loss");
        }
        if let Some(logger) = metrics {
            logger.log(&row)?;
        }
        history.push(row);
    }

    tracing::info!("Training complete after {} epochs", settings.epochs);
    Ok(TrainingOutcome { model: model.valid(), device, history })
}
