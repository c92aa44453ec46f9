// ============================================================
// Layer 6: Weight Store
// ============================================================
// Persists the trained network as one self-describing JSON
// artifact that any runtime can load without Burn:
//
//   model/
//     weights.json        ← architecture + every tensor, flattened
//     train_config.json   ← hyperparameters of the run
//     metrics.csv         ← epoch,train_loss,val_loss
//
// weights.json:
//   {
//     "version": "1.0.0",
//     "architecture": "...",
//     "totalParameters": 353,
//     "trainingExamples": 1000,
//     "epochs": 100,
//     "finalMAE": 3.2,
//     "trainedAt": "2024-...Z",
//     "weights": [ { "shape": [12, 16], "data": [...] }, ... ]
//   }
//
// `weights` lists each layer's kernel then its bias, in layer
// order. Kernels are [inputs, outputs], row-major.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::EcoScoreConfig;

/// Schema version written into every artifact.
pub const ARTIFACT_VERSION: &str = "1.0.0";

pub const WEIGHTS_FILE: &str = "weights.json";
pub const CONFIG_FILE:  &str = "train_config.json";

// ─── Artifact types ───────────────────────────────────────────────────────────
/// One flattened tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTensor {
    pub shape: Vec<usize>,
    pub data:  Vec<f32>,
}

impl LayerTensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self { shape, data }
    }

    /// Number of elements the shape promises.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelWeights {
    pub version:           String,
    pub architecture:      String,
    pub total_parameters:  usize,
    pub training_examples: usize,
    pub epochs:            usize,
    #[serde(rename = "finalMAE")]
    pub final_mae:         f64,
    pub trained_at:        String,
    pub weights:           Vec<LayerTensor>,
}

impl ModelWeights {
    /// Check the declared architecture and the tensor list against the
    /// network they will be loaded into.
    pub fn validate(&self, config: &EcoScoreConfig) -> Result<()> {
        if self.architecture != config.descriptor() {
            bail!(
                "Weights artifact declares architecture '{}', expected '{}'",
                self.architecture,
                config.descriptor()
            );
        }
        if self.total_parameters != config.parameter_count() {
            bail!(
                "Weights artifact declares {} parameters, architecture needs {}",
                self.total_parameters,
                config.parameter_count()
            );
        }

        let expected = config.layer_shapes();
        if self.weights.len() != expected.len() {
            bail!(
                "Weights artifact has {} tensors, architecture '{}' needs {}",
                self.weights.len(),
                config.descriptor(),
                expected.len()
            );
        }
        for (i, (tensor, shape)) in self.weights.iter().zip(&expected).enumerate() {
            if &tensor.shape != shape {
                bail!("Tensor {i} has shape {:?}, expected {:?}", tensor.shape, shape);
            }
            if tensor.data.len() != tensor.numel() {
                bail!(
                    "Tensor {i} has {} values but shape {:?} needs {}",
                    tensor.data.len(),
                    tensor.shape,
                    tensor.numel()
                );
            }
        }
        Ok(())
    }
}

// ─── WeightStore ──────────────────────────────────────────────────────────────
/// Reads and writes artifacts inside one output directory.
pub struct WeightStore {
    dir: PathBuf,
}

impl WeightStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(WEIGHTS_FILE)
    }

    pub fn save_weights(&self, weights: &ModelWeights) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        let path = self.weights_path();
        let json = serde_json::to_string_pretty(weights)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write weights to '{}'", path.display()))?;

        tracing::info!(
            "Saved {} parameters to '{}'",
            weights.total_parameters,
            path.display()
        );
        Ok(path)
    }

    pub fn load_weights(&self) -> Result<ModelWeights> {
        let path = self.weights_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read weights from '{}'. Have you run 'train' first?",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid weights artifact", path.display()))
    }

    /// Save the training configuration next to the weights.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ModelWeights {
        let config = EcoScoreConfig::new();
        let weights = config
            .layer_shapes()
            .into_iter()
            .map(|shape| {
                let n = shape.iter().product();
                LayerTensor::new(shape, vec![0.5; n])
            })
            .collect();
        ModelWeights {
            version:           ARTIFACT_VERSION.to_string(),
            architecture:      config.descriptor(),
            total_parameters:  config.parameter_count(),
            training_examples: 10,
            epochs:            1,
            final_mae:         4.5,
            trained_at:        "2024-01-01T00:00:00Z".to_string(),
            weights,
        }
    }

    #[test]
    fn test_json_field_names() {
        let raw = serde_json::to_value(artifact()).unwrap();
        assert_eq!(raw["totalParameters"], 353);
        assert_eq!(raw["finalMAE"], 4.5);
        assert_eq!(raw["weights"][0]["shape"], serde_json::json!([12, 16]));
        assert_eq!(raw["weights"][5]["shape"], serde_json::json!([1]));
        assert!(raw.get("trainedAt").is_some());
        assert!(raw.get("trainingExamples").is_some());
    }

    #[test]
    fn test_save_then_load() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = WeightStore::new(tmp.path().join("model"));
        store.save_weights(&artifact()).unwrap();

        let loaded = store.load_weights().unwrap();
        assert_eq!(loaded.weights, artifact().weights);
        loaded.validate(&EcoScoreConfig::new()).unwrap();
    }

    #[test]
    fn test_validate_rejects_wrong_shapes() {
        let config = EcoScoreConfig::new();

        let mut missing = artifact();
        missing.weights.pop();
        assert!(missing.validate(&config).is_err());

        let mut transposed = artifact();
        transposed.weights[0].shape = vec![16, 12];
        assert!(transposed.validate(&config).is_err());

        let mut short = artifact();
        short.weights[1].data.pop();
        assert!(short.validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_declaration() {
        let config = EcoScoreConfig::new();

        let mut renamed = artifact();
        renamed.architecture = "dense(12→32, relu) → dense(32→1, sigmoid)".to_string();
        let err = renamed.validate(&config).unwrap_err();
        assert!(err.to_string().contains("architecture"));

        let mut miscounted = artifact();
        miscounted.total_parameters = 161;
        let err = miscounted.validate(&config).unwrap_err();
        assert!(err.to_string().contains("161"));
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = WeightStore::new(tmp.path()).load_weights().unwrap_err();
        assert!(err.to_string().contains("train"));
    }
}
