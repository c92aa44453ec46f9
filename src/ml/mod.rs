// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// All Burn-specific network code lives here. The data layer
// only builds tensors (batcher.rs); everything that owns
// parameters or gradients is in this layer.
//
//   model.rs      12 → 16 → 8 → 1 regressor, plus conversion
//                 to and from flattened artifact tensors
//
//   trainer.rs    Epoch loop: per-epoch split, Adam steps,
//                 validation loss, progress reports
//
//   evaluator.rs  Fixed hand-labeled scenarios and their MAE
//
//   inferencer.rs Rebuilds the network from weights.json and
//                 scores products
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Feed-forward eco-score regressor
pub mod model;

/// Training loop with per-epoch validation
pub mod trainer;

/// Scenario-based post-training evaluation
pub mod evaluator;

/// Inference from a saved weights artifact
pub mod inferencer;
