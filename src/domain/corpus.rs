// ============================================================
// Layer 3: Training Corpus
// ============================================================
// The mined dataset plus enough provenance to tell, months
// later, where it came from and what it looks like:
//   - when it was fetched and from which endpoint
//   - how many records were scanned vs kept
//   - grade and score-bucket distributions
//
// Written once at the end of a mining run, read back by the
// `train --corpus` path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::{CanonicalProduct, GradeHistogram};

/// Score buckets, [0,20) [20,40) [40,60) [60,80) [80,100].
pub const SCORE_BUCKETS: [&str; 5] = ["0-19", "20-39", "40-59", "60-79", "80-100"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingCorpus {
    pub fetched_at: String,
    pub source: String,
    pub total_products: usize,
    pub total_scanned: usize,
    pub pipeline: String,
    pub grade_distribution: GradeHistogram,
    pub score_distribution: BTreeMap<String, usize>,
    pub products: Vec<CanonicalProduct>,
}

impl TrainingCorpus {
    /// Build the corpus and its histograms from the final product list.
    pub fn assemble(
        products:      Vec<CanonicalProduct>,
        total_scanned: usize,
        source:        impl Into<String>,
        pipeline:      impl Into<String>,
        fetched_at:    impl Into<String>,
    ) -> Self {
        let mut grade_distribution = GradeHistogram::default();
        for p in &products {
            grade_distribution.record(p.ecoscore_grade);
        }
        Self {
            fetched_at: fetched_at.into(),
            source: source.into(),
            total_products: products.len(),
            total_scanned,
            pipeline: pipeline.into(),
            grade_distribution,
            score_distribution: score_histogram(&products),
            products,
        }
    }
}

/// Bucket label for a score already known to lie in [0, 100].
pub fn score_bucket(score: f64) -> &'static str {
    let idx = ((score / 20.0).floor() as isize).clamp(0, 4) as usize;
    SCORE_BUCKETS[idx]
}

/// Histogram over all five buckets; empty buckets are present with 0.
pub fn score_histogram(products: &[CanonicalProduct]) -> BTreeMap<String, usize> {
    let mut hist: BTreeMap<String, usize> =
        SCORE_BUCKETS.iter().map(|b| (b.to_string(), 0)).collect();
    for p in products {
        *hist.entry(score_bucket(p.ecoscore_score).to_string()).or_insert(0) += 1;
    }
    hist
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(score_bucket(0.0), "0-19");
        assert_eq!(score_bucket(19.99), "0-19");
        assert_eq!(score_bucket(20.0), "20-39");
        assert_eq!(score_bucket(79.5), "60-79");
        assert_eq!(score_bucket(80.0), "80-100");
        // 100 belongs to the closed top bucket
        assert_eq!(score_bucket(100.0), "80-100");
    }

    #[test]
    fn test_empty_histogram_has_all_buckets() {
        let hist = score_histogram(&[]);
        assert_eq!(hist.len(), 5);
        assert!(hist.values().all(|&n| n == 0));
    }
}
