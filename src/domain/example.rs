// ============================================================
// Layer 3: Training Example Types
// ============================================================
// ProductSignals   the human-readable inputs of the encoder
//                  (category, NOVA group, label/packaging/
//                  origin indicators)
// SeedExample      signals plus a hand-assigned score, as
//                  stored in the seed dataset file
// FeatureVector    the fixed 12-number network input
// LabeledExample   (FeatureVector, score / 100)

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::lenient;

/// Length of every feature vector.
pub const FEATURE_DIM: usize = 12;

/// Position of the continuous processing-level estimate.
pub const PROCESSING_FEATURE: usize = FEATURE_DIM - 1;

// ─── ProductSignals ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSignals {
    pub category: Category,

    /// NOVA processing group, 1 (unprocessed) to 4 (ultra-processed)
    pub nova: u8,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub organic: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub fairtrade: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub eco_cert: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub recyclable: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub glass: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub plastic: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub local: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub far: bool,

    #[serde(default)]
    pub cert_count: u32,

    /// Continuous processing estimate in [0, 1]
    #[serde(default)]
    pub processing: f32,
}

// ─── SeedExample ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedExample {
    #[serde(flatten)]
    pub signals: ProductSignals,

    /// Hand-assigned eco-score on the 0-100 scale
    pub score: f32,
}

// ─── FeatureVector ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn processing(&self) -> f32 {
        self.0[PROCESSING_FEATURE]
    }

    pub fn with_processing(mut self, value: f32) -> Self {
        self.0[PROCESSING_FEATURE] = value;
        self
    }
}

// ─── LabeledExample ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub features: FeatureVector,

    /// Normalised target: score / 100, in [0, 1]
    pub target: f32,
}

impl LabeledExample {
    pub fn score(&self) -> f32 {
        self.target * 100.0
    }
}
