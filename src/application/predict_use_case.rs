// ============================================================
// Layer 2: PredictUseCase
// ============================================================
// Scores one product description with a trained artifact:
//
//   Step 1: Load weights.json        (Layer 6 - infra)
//   Step 2: Rebuild the network      (Layer 5 - ml)
//   Step 3: Encode + predict         (Layer 4 / 5)

use anyhow::Result;

use crate::domain::example::ProductSignals;
use crate::infra::weight_store::WeightStore;
use crate::ml::inferencer::{Prediction, ScorePredictor};

pub struct PredictUseCase {
    predictor: ScorePredictor,
}

impl PredictUseCase {
    pub fn new(model_dir: &str) -> Result<Self> {
        let store     = WeightStore::new(model_dir);
        let weights   = store.load_weights()?;
        let predictor = ScorePredictor::from_weights(&weights)?;
        if let Ok(cfg) = store.load_config() {
            tracing::debug!(
                "Model trained for {} epochs from '{}' (augment x{})",
                cfg.epochs, cfg.seed_file, cfg.augment_factor
            );
        }
        Ok(Self { predictor })
    }

    pub fn predict(&self, signals: &ProductSignals) -> Result<Prediction> {
        let prediction = self.predictor.predict(signals)?;
        tracing::debug!(
            "{} nova={} → {:.1} ({})",
            signals.category, signals.nova, prediction.score, prediction.grade
        );
        Ok(prediction)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::infra::weight_store::{LayerTensor, ModelWeights, ARTIFACT_VERSION};
    use crate::ml::model::EcoScoreConfig;

    #[test]
    fn test_predict_from_saved_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = EcoScoreConfig::new();

        // zero kernels, output bias 2.0 → sigmoid(2) ≈ 0.8808
        let mut weights: Vec<LayerTensor> = cfg
            .layer_shapes()
            .into_iter()
            .map(|s| {
                let n = s.iter().product();
                LayerTensor::new(s, vec![0.0; n])
            })
            .collect();
        weights[5].data = vec![2.0];

        WeightStore::new(tmp.path())
            .save_weights(&ModelWeights {
                version:           ARTIFACT_VERSION.into(),
                architecture:      cfg.descriptor(),
                total_parameters:  cfg.parameter_count(),
                training_examples: 1,
                epochs:            1,
                final_mae:         0.0,
                trained_at:        "2024-01-01T00:00:00Z".into(),
                weights,
            })
            .unwrap();

        let use_case = PredictUseCase::new(&tmp.path().display().to_string()).unwrap();
        let signals = ProductSignals {
            category: Category::Legumes,
            nova: 1,
            organic: true, fairtrade: false, eco_cert: false, recyclable: true,
            glass: false, plastic: false, local: true, far: false,
            cert_count: 1,
            processing: 0.0,
        };
        let p = use_case.predict(&signals).unwrap();
        assert!((p.score - 88.079_71).abs() < 1e-3);
        assert_eq!(p.grade.as_str(), "a");
    }

    #[test]
    fn test_missing_model_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(PredictUseCase::new(&tmp.path().join("nope").display().to_string()).is_err());
    }
}
