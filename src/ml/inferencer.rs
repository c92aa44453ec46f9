// ============================================================
// Layer 5: Inferencer
// ============================================================
// Loads a weights artifact, rebuilds the network on the CPU
// backend and scores products. This is the same path any
// on-device consumer of weights.json has to follow:
//
//   signals → encode() → forward() → ×100 → grade band

use anyhow::{Context, Result};
use burn::backend::ndarray::NdArrayDevice;

use crate::data::encoder::encode;
use crate::domain::example::{FeatureVector, ProductSignals};
use crate::domain::product::Grade;
use crate::infra::weight_store::ModelWeights;
use crate::ml::model::{EcoScoreConfig, EcoScoreModel};
use crate::ml::trainer::EvalBackend;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// 0-100
    pub score: f32,
    pub grade: Grade,
}

pub struct ScorePredictor {
    model:  EcoScoreModel<EvalBackend>,
    device: NdArrayDevice,
}

impl ScorePredictor {
    pub fn from_weights(weights: &ModelWeights) -> Result<Self> {
        let config = EcoScoreConfig::new();
        weights
            .validate(&config)
            .context("Weights artifact does not match the network architecture")?;

        let device = NdArrayDevice::default();
        let model  = EcoScoreModel::from_layer_tensors(&config, &weights.weights, &device)?;
        tracing::info!(
            "Model loaded: {} parameters, trained {} on {} examples",
            weights.total_parameters,
            weights.trained_at,
            weights.training_examples
        );
        Ok(Self { model, device })
    }

    pub fn predict(&self, signals: &ProductSignals) -> Result<Prediction> {
        let score = self
            .predict_features(&[encode(signals)])?
            .first()
            .copied()
            .context("Model returned no output")?;
        Ok(Prediction { score, grade: Grade::from_score(score) })
    }

    pub fn predict_features(&self, rows: &[FeatureVector]) -> Result<Vec<f32>> {
        self.model.predict_scores(rows, &self.device)
    }
}
