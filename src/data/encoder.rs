// ============================================================
// Layer 4: Feature Encoder
// ============================================================
// Maps a product to the 12-number network input:
//
//   idx  feature              encoding
//   ───  ───────────────────  ─────────────────────────────
//    0   category             index / (C - 1)
//    1   NOVA group           nova / 4       (nova clamped 1..4)
//    2   organic              0 | 1
//    3   fair trade           0 | 1
//    4   eco certification    0 | 1
//    5   recyclable packaging 0 | 1
//    6   glass packaging      0 | 1
//    7   plastic packaging    0 | 1
//    8   local origin         0 | 1
//    9   distant origin       0 | 1
//   10   certification count  min(count, 5) / 5
//   11   processing level     clamped to [0, 1]
//
// Training and inference both call `encode`. Change this table
// and every deployed weights file becomes meaningless, so
// treat it as a wire format.

use crate::domain::category::strip_language;
use crate::domain::example::{FeatureVector, LabeledExample, ProductSignals, SeedExample, FEATURE_DIM};
use crate::domain::product::CanonicalProduct;

/// Certification count that saturates feature 10.
pub const MAX_CERT_COUNT: u32 = 5;

/// NOVA group assumed when a product has none.
pub const DEFAULT_NOVA: u8 = 3;

/// Label keywords that count as a recognised eco-certification.
const ECO_CERT_KEYWORDS: [&str; 10] = [
    "rainforest-alliance", "msc", "asc", "ecolabel", "utz", "fsc", "pefc",
    "demeter", "bee-friendly", "carbon-neutral",
];

// ─── Core encoding ────────────────────────────────────────────────────────────
/// Encode signals into a feature vector. Every coordinate ends up in [0, 1].
pub fn encode(s: &ProductSignals) -> FeatureVector {
    let nova = s.nova.clamp(1, 4) as f32;
    let features: [f32; FEATURE_DIM] = [
        s.category.normalized_index(),
        nova / 4.0,
        bit(s.organic),
        bit(s.fairtrade),
        bit(s.eco_cert),
        bit(s.recyclable),
        bit(s.glass),
        bit(s.plastic),
        bit(s.local),
        bit(s.far),
        s.cert_count.min(MAX_CERT_COUNT) as f32 / MAX_CERT_COUNT as f32,
        unit(s.processing),
    ];
    FeatureVector(features)
}

/// Seed example → (features, score / 100).
pub fn encode_seed(seed: &SeedExample) -> LabeledExample {
    LabeledExample {
        features: encode(&seed.signals),
        target: normalize_score(seed.score),
    }
}

/// Mined product → (features, score / 100).
pub fn encode_product(product: &CanonicalProduct, origins: &OriginPolicy) -> LabeledExample {
    LabeledExample {
        features: encode(&signals_from_product(product, origins)),
        target: normalize_score(product.ecoscore_score as f32),
    }
}

/// Score in points → target in [0, 1].
pub fn normalize_score(score: f32) -> f32 {
    unit(score / 100.0)
}

fn bit(flag: bool) -> f32 {
    if flag { 1.0 } else { 0.0 }
}

/// Clamp to [0, 1]; NaN becomes 0.
pub fn unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

// ─── Signal derivation from catalog tags ──────────────────────────────────────
/// Which origins count as "local". Anything else that is known
/// counts as distant; products with no origin info are neither.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    pub local_regions: Vec<String>,
}

impl Default for OriginPolicy {
    fn default() -> Self {
        let regions = [
            "local", "european-union", "europe", "france", "germany", "italy",
            "spain", "portugal", "belgium", "netherlands", "luxembourg",
            "switzerland", "austria", "united-kingdom", "ireland", "denmark",
            "sweden", "poland",
        ];
        Self { local_regions: regions.iter().map(|r| r.to_string()).collect() }
    }
}

impl OriginPolicy {
    /// (local, far) for a product's origin tags and free-text origin.
    pub fn classify(&self, tags: &[String], free_text: &str) -> (bool, bool) {
        let mut places: Vec<String> = tags
            .iter()
            .map(|t| strip_language(t).to_ascii_lowercase())
            .collect();
        places.extend(
            free_text
                .split(',')
                .map(|p| p.trim().to_ascii_lowercase().replace(' ', "-"))
                .filter(|p| !p.is_empty()),
        );
        if places.is_empty() {
            return (false, false);
        }
        let local = places.iter().any(|p| self.local_regions.iter().any(|r| r == p));
        (local, !local)
    }
}

/// Derive encoder inputs from a mined product's tags.
pub fn signals_from_product(p: &CanonicalProduct, origins: &OriginPolicy) -> ProductSignals {
    let labels: Vec<&str> = p.labels.iter().map(|l| strip_language(l)).collect();
    let is_organic = |l: &str| l.contains("organic") || l == "bio" || l.starts_with("bio-");
    let is_fair = |l: &str| l.contains("fair-trade") || l.contains("fairtrade");
    let is_eco = |l: &str| ECO_CERT_KEYWORDS.iter().any(|k| l.contains(k));

    let packaging: Vec<&str> = p.packaging.iter().map(|t| strip_language(t)).collect();
    let recyclable = packaging
        .iter()
        .any(|t| t.contains("recycl") && !t.starts_with("non-") && !t.starts_with("not-"));
    let glass = packaging.iter().any(|t| t.contains("glass"));
    let plastic = packaging.iter().any(|t| t.contains("plastic") || *t == "pet");

    let (local, far) = origins.classify(&p.origins_tags, &p.origins);
    let nova = p.nova_group.unwrap_or(DEFAULT_NOVA).clamp(1, 4);

    ProductSignals {
        category: p.category,
        nova,
        organic: labels.iter().any(|l| is_organic(l)),
        fairtrade: labels.iter().any(|l| is_fair(l)),
        eco_cert: labels.iter().any(|l| is_eco(l)),
        recyclable,
        glass,
        plastic,
        local,
        far,
        cert_count: labels
            .iter()
            .filter(|l| is_organic(l) || is_fair(l) || is_eco(l))
            .count() as u32,
        processing: (nova - 1) as f32 / 3.0,
    }
}
