// ============================================================
// Layer 5: Eco-Score Regressor
// ============================================================
//   features [N, 12]
//       → Dense(16) → ReLU
//       → Dense(8)  → ReLU
//       → Dense(1)  → sigmoid
//   score    [N, 1]   in (0, 1), ×100 for points
//
// Every dense layer uses Kaiming (He) uniform initialisation.
// In Burn's formulation the bound is gain * sqrt(3 / fan_in),
// so gain = sqrt(2) gives He's sqrt(6 / fan_in).
//
// Reference: Burn Book §3 (Building Blocks)
//            He et al. (2015) Delving Deep into Rectifiers

use anyhow::{anyhow, Context, Result};
use burn::{
    module::Param,
    nn::{
        loss::{MseLoss, Reduction},
        Initializer, Linear, LinearConfig,
    },
    prelude::*,
    tensor::{
        activation::{relu, sigmoid},
        TensorData,
    },
};

use crate::domain::example::{FeatureVector, FEATURE_DIM};
use crate::infra::weight_store::LayerTensor;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct EcoScoreConfig {
    #[config(default = 12)]
    pub input_dim: usize,
    #[config(default = 16)]
    pub hidden1:   usize,
    #[config(default = 8)]
    pub hidden2:   usize,
}

impl EcoScoreConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EcoScoreModel<B> {
        EcoScoreModel {
            dense1: dense(self.input_dim, self.hidden1, device),
            dense2: dense(self.hidden1, self.hidden2, device),
            output: dense(self.hidden2, 1, device),
        }
    }

    /// Human-readable architecture, stored in the weights artifact.
    pub fn descriptor(&self) -> String {
        format!(
            "dense({}→{}, relu) → dense({}→{}, relu) → dense({}→1, sigmoid)",
            self.input_dim, self.hidden1, self.hidden1, self.hidden2, self.hidden2
        )
    }

    /// Kernel then bias, layer by layer.
    pub fn layer_shapes(&self) -> Vec<Vec<usize>> {
        vec![
            vec![self.input_dim, self.hidden1],
            vec![self.hidden1],
            vec![self.hidden1, self.hidden2],
            vec![self.hidden2],
            vec![self.hidden2, 1],
            vec![1],
        ]
    }

    pub fn parameter_count(&self) -> usize {
        self.layer_shapes()
            .iter()
            .map(|s| s.iter().product::<usize>())
            .sum()
    }
}

fn dense<B: Backend>(d_in: usize, d_out: usize, device: &B::Device) -> Linear<B> {
    LinearConfig::new(d_in, d_out)
        .with_initializer(Initializer::KaimingUniform {
            gain:         std::f64::consts::SQRT_2,
            fan_out_only: false,
        })
        .init(device)
}

#[derive(Module, Debug)]
pub struct EcoScoreModel<B: Backend> {
    pub dense1: Linear<B>,
    pub dense2: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> EcoScoreModel<B> {
    /// features: [batch, 12] → normalised scores: [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.dense1.forward(features));
        let x = relu(self.dense2.forward(x));
        sigmoid(self.output.forward(x))
    }

    /// Mean squared error against normalised targets [batch, 1].
    pub fn forward_loss(&self, features: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let predicted = self.forward(features);
        MseLoss::new().forward(predicted, targets, Reduction::Mean)
    }

    /// Predicted scores in points (0-100), one per input row.
    pub fn predict_scores(&self, features: &[FeatureVector], device: &B::Device) -> Result<Vec<f32>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        let output = self.forward(feature_tensor(features, device));
        Ok(tensor_values(output)?.into_iter().map(|s| s * 100.0).collect())
    }

    /// Flatten every parameter, kernel then bias, layer by layer.
    pub fn to_layer_tensors(&self) -> Result<Vec<LayerTensor>> {
        let mut out = Vec::with_capacity(6);
        for layer in [&self.dense1, &self.dense2, &self.output] {
            let kernel = layer.weight.val();
            let shape  = kernel.dims().to_vec();
            out.push(LayerTensor::new(shape, tensor_values(kernel)?));

            let bias = layer.bias.as_ref().context("dense layer has no bias")?.val();
            let shape = bias.dims().to_vec();
            out.push(LayerTensor::new(shape, tensor_values(bias)?));
        }
        Ok(out)
    }

    /// Rebuild a model from flattened tensors, checking every shape.
    pub fn from_layer_tensors(
        config:  &EcoScoreConfig,
        tensors: &[LayerTensor],
        device:  &B::Device,
    ) -> Result<Self> {
        let expected = config.layer_shapes();
        if tensors.len() != expected.len() {
            return Err(anyhow!(
                "Expected {} tensors, got {}",
                expected.len(),
                tensors.len()
            ));
        }
        for (i, (t, shape)) in tensors.iter().zip(&expected).enumerate() {
            if &t.shape != shape || t.data.len() != t.numel() {
                return Err(anyhow!(
                    "Tensor {i}: shape {:?} with {} values does not fit {:?}",
                    t.shape,
                    t.data.len(),
                    shape
                ));
            }
        }

        let mut model = config.init::<B>(device);
        load_dense(&mut model.dense1, &tensors[0], &tensors[1], device);
        load_dense(&mut model.dense2, &tensors[2], &tensors[3], device);
        load_dense(&mut model.output, &tensors[4], &tensors[5], device);
        Ok(model)
    }
}

/// Shapes must already be validated.
fn load_dense<B: Backend>(
    layer:  &mut Linear<B>,
    kernel: &LayerTensor,
    bias:   &LayerTensor,
    device: &B::Device,
) {
    let w = Tensor::<B, 2>::from_data(
        TensorData::new(kernel.data.clone(), [kernel.shape[0], kernel.shape[1]]),
        device,
    );
    let b = Tensor::<B, 1>::from_data(TensorData::new(bias.data.clone(), [bias.shape[0]]), device);
    layer.weight = Param::from_tensor(w);
    layer.bias   = Some(Param::from_tensor(b));
}

/// Stack feature vectors into a [N, 12] tensor.
pub fn feature_tensor<B: Backend>(rows: &[FeatureVector], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.as_slice().iter().copied()).collect();
    Tensor::from_data(TensorData::new(flat, [rows.len(), FEATURE_DIM]), device)
}

/// Read a float tensor back to host memory.
pub fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn probe() -> Vec<FeatureVector> {
        (0..5)
            .map(|i| {
                let mut v = [0.0f32; FEATURE_DIM];
                for (k, x) in v.iter_mut().enumerate() {
                    *x = ((i * 7 + k * 3) % 11) as f32 / 10.0;
                }
                FeatureVector(v)
            })
            .collect()
    }

    #[test]
    fn test_default_architecture() {
        let cfg = EcoScoreConfig::new();
        assert_eq!(cfg.parameter_count(), 12 * 16 + 16 + 16 * 8 + 8 + 8 + 1);
        assert_eq!(cfg.layer_shapes()[0], vec![12, 16]);
        assert_eq!(cfg.layer_shapes()[4], vec![8, 1]);
    }

    #[test]
    fn test_output_is_a_score() {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let model: EcoScoreModel<B> = EcoScoreConfig::new().init(&device);
        let scores = model.predict_scores(&probe(), &device).unwrap();
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
    }

    #[test]
    fn test_layer_tensor_round_trip() {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let cfg = EcoScoreConfig::new();
        let model: EcoScoreModel<B> = cfg.init(&device);

        let tensors = model.to_layer_tensors().unwrap();
        let shapes: Vec<Vec<usize>> = tensors.iter().map(|t| t.shape.clone()).collect();
        assert_eq!(shapes, cfg.layer_shapes());

        let rebuilt = EcoScoreModel::<B>::from_layer_tensors(&cfg, &tensors, &device).unwrap();
        assert_eq!(rebuilt.to_layer_tensors().unwrap(), tensors);

        let before = model.predict_scores(&probe(), &device).unwrap();
        let after  = rebuilt.predict_scores(&probe(), &device).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!((a / 100.0 - b / 100.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rebuild_rejects_bad_shapes() {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let cfg = EcoScoreConfig::new();
        let model: EcoScoreModel<B> = cfg.init(&device);
        let mut tensors = model.to_layer_tensors().unwrap();
        tensors[2].shape = vec![8, 16];
        assert!(EcoScoreModel::<B>::from_layer_tensors(&cfg, &tensors, &device).is_err());
        tensors.truncate(4);
        assert!(EcoScoreModel::<B>::from_layer_tensors(&cfg, &tensors, &device).is_err());
    }
}
