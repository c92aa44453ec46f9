// ============================================================
// Layer 4: Augmenter
// ============================================================
// Multiplies a small seed set with jittered copies.
//
//   output = seed (verbatim, in order)
//          + `factor` rounds, each one noisy copy per seed example
//
// Per copy:
//   processing feature  += U[-0.1, 0.1], clamped to [0, 1]
//   score               += U[-5%, +5%] of itself, clamped to [0, 100]
//
// Only the processing level and the target move. Categorical
// and boolean features stay exact, so a copy never describes a
// product that could not exist.
//
// The RNG is a parameter: a seeded StdRng gives the same
// augmented set on every run.

use rand::Rng;

use crate::data::encoder::{normalize_score, unit};
use crate::domain::example::LabeledExample;

/// Absolute jitter applied to the processing feature.
pub const PROCESSING_JITTER: f32 = 0.1;

/// Relative jitter applied to the target score.
pub const SCORE_JITTER: f32 = 0.05;

/// Returns `seed.len() * (factor + 1)` examples, seed first.
pub fn augment<R: Rng + ?Sized>(
    seed:   &[LabeledExample],
    factor: usize,
    rng:    &mut R,
) -> Vec<LabeledExample> {
    let mut out = Vec::with_capacity(seed.len() * (factor + 1));
    out.extend_from_slice(seed);

    for _ in 0..factor {
        for example in seed {
            out.push(jitter(example, rng));
        }
    }

    tracing::debug!(
        "Augmented {} seed examples x{} → {} examples",
        seed.len(),
        factor + 1,
        out.len()
    );
    out
}

fn jitter<R: Rng + ?Sized>(example: &LabeledExample, rng: &mut R) -> LabeledExample {
    let processing = unit(
        example.features.processing() + rng.gen_range(-PROCESSING_JITTER..=PROCESSING_JITTER),
    );

    let score = example.score();
    let noisy = score + score * rng.gen_range(-SCORE_JITTER..=SCORE_JITTER);

    LabeledExample {
        features: example.features.with_processing(processing),
        target:   normalize_score(noisy),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::{FeatureVector, FEATURE_DIM, PROCESSING_FEATURE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seed() -> Vec<LabeledExample> {
        vec![
            LabeledExample {
                features: FeatureVector([0.0; FEATURE_DIM]),
                target:   0.92,
            },
            LabeledExample {
                features: FeatureVector([1.0; FEATURE_DIM]),
                target:   0.08,
            },
            LabeledExample {
                features: FeatureVector([0.5; FEATURE_DIM]),
                target:   1.0,
            },
        ]
    }

    #[test]
    fn test_size_law_and_verbatim_prefix() {
        let seed = seed();
        let mut rng = StdRng::seed_from_u64(7);
        for factor in [0, 1, 4] {
            let out = augment(&seed, factor, &mut rng);
            assert_eq!(out.len(), seed.len() * (factor + 1));
            assert_eq!(&out[..seed.len()], &seed[..]);
        }
    }

    #[test]
    fn test_empty_seed_gives_empty_output() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(augment(&[], 4, &mut rng).is_empty());
    }

    #[test]
    fn test_noise_stays_in_bounds() {
        let seed = seed();
        let mut rng = StdRng::seed_from_u64(42);
        let out = augment(&seed, 50, &mut rng);

        for (i, copy) in out.iter().enumerate().skip(seed.len()) {
            let original = &seed[i % seed.len()];
            assert!((0.0..=1.0).contains(&copy.target));
            assert!((0.0..=1.0).contains(&copy.features.processing()));
            assert!((copy.score() - original.score()).abs() <= original.score() * SCORE_JITTER + 1e-3);
            assert!(
                (copy.features.processing() - original.features.processing()).abs()
                    <= PROCESSING_JITTER + 1e-6
            );
            // only the processing coordinate moves
            for k in (0..FEATURE_DIM).filter(|&k| k != PROCESSING_FEATURE) {
                assert_eq!(copy.features.0[k], original.features.0[k]);
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let seed = seed();
        let a = augment(&seed, 3, &mut StdRng::seed_from_u64(42));
        let b = augment(&seed, 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
