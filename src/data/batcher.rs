// ============================================================
// Layer 4: Example Batcher
// ============================================================
// Stacks LabeledExamples into tensors for one forward pass.
//
//   Input:  N examples, each 12 features + 1 target
//   Output: EcoBatch { features: [N, 12], targets: [N, 1] }
//
// Features are flattened row-major into one Vec<f32>, then
// handed to Burn as TensorData with the 2D shape attached.
//
// Reference: Burn Book §4 (Batcher)

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::domain::example::{LabeledExample, FEATURE_DIM};

// ─── EcoBatch ─────────────────────────────────────────────────────────────────
/// A batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct EcoBatch<B: Backend> {
    /// shape: [batch_size, FEATURE_DIM]
    pub features: Tensor<B, 2>,

    /// Normalised scores, shape: [batch_size, 1]
    pub targets: Tensor<B, 2>,
}

// ─── EcoBatcher ───────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct EcoBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> EcoBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn batch(&self, items: &[LabeledExample]) -> EcoBatch<B> {
        let batch_size = items.len();

        let features: Vec<f32> = items
            .iter()
            .flat_map(|e| e.features.as_slice().iter().copied())
            .collect();
        let targets: Vec<f32> = items.iter().map(|e| e.target).collect();

        EcoBatch {
            features: Tensor::from_data(
                TensorData::new(features, [batch_size, FEATURE_DIM]),
                &self.device,
            ),
            targets: Tensor::from_data(
                TensorData::new(targets, [batch_size, 1]),
                &self.device,
            ),
        }
    }

    /// Split `items` into consecutive batches of at most `batch_size`.
    pub fn batches<'a>(
        &'a self,
        items:      &'a [LabeledExample],
        batch_size: usize,
    ) -> impl Iterator<Item = EcoBatch<B>> + 'a {
        items.chunks(batch_size.max(1)).map(move |chunk| self.batch(chunk))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::FeatureVector;
    use burn::backend::NdArray;

    fn example(v: f32) -> LabeledExample {
        LabeledExample { features: FeatureVector([v; FEATURE_DIM]), target: v }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = EcoBatcher::<NdArray>::new(Default::default());
        let batch   = batcher.batch(&[example(0.1), example(0.2), example(0.3)]);
        assert_eq!(batch.features.dims(), [3, FEATURE_DIM]);
        assert_eq!(batch.targets.dims(), [3, 1]);

        let targets = batch.targets.into_data().to_vec::<f32>().unwrap();
        assert_eq!(targets, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_last_batch_may_be_short() {
        let batcher = EcoBatcher::<NdArray>::new(Default::default());
        let items: Vec<_> = (0..35).map(|i| example(i as f32 / 35.0)).collect();
        let sizes: Vec<usize> = batcher.batches(&items, 16).map(|b| b.features.dims()[0]).collect();
        assert_eq!(sizes, vec![16, 16, 3]);
    }
}
