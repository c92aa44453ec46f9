// ============================================================
// Layer 5: Scenario Evaluator
// ============================================================
// A fixed set of hand-labeled products, scored by the trained
// network after every run. The result is a mean absolute error
// in score points. It is a sanity check on the learned shape
// of the function, not a pass/fail gate.

use std::fmt;

use anyhow::Result;
use burn::prelude::*;

use crate::data::encoder::encode;
use crate::domain::category::Category;
use crate::domain::example::ProductSignals;
use crate::ml::model::EcoScoreModel;

pub struct Scenario {
    pub name:     &'static str,
    pub signals:  ProductSignals,
    /// Hand-assigned score, 0-100
    pub expected: f32,
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name:      &'static str,
    pub expected:  f32,
    pub predicted: f32,
}

impl ScenarioResult {
    pub fn abs_error(&self) -> f32 {
        (self.predicted - self.expected).abs()
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub results: Vec<ScenarioResult>,
    /// Mean absolute error in score points
    pub mae:     f64,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            writeln!(
                f,
                "  {:<36} expected {:>5.1}  predicted {:>5.1}  (|err| {:.1})",
                r.name,
                r.expected,
                r.predicted,
                r.abs_error()
            )?;
        }
        write!(f, "  MAE: {:.2} points", self.mae)
    }
}

// ─── Scenario set ─────────────────────────────────────────────────────────────
#[allow(clippy::too_many_arguments)]
fn signals(
    category:   Category,
    nova:       u8,
    organic:    bool,
    fairtrade:  bool,
    eco_cert:   bool,
    recyclable: bool,
    glass:      bool,
    plastic:    bool,
    local:      bool,
    far:        bool,
    cert_count: u32,
    processing: f32,
) -> ProductSignals {
    ProductSignals {
        category, nova, organic, fairtrade, eco_cert, recyclable,
        glass, plastic, local, far, cert_count, processing,
    }
}

/// The fixed evaluation set.
pub fn scenarios() -> Vec<Scenario> {
    use Category::*;
    vec![
        Scenario {
            name:     "organic local fruit",
            signals:  signals(FruitsAndVegetables, 1, true, false, true, true, false, false, true, false, 2, 0.0),
            expected: 92.0,
        },
        Scenario {
            name:     "ultra-processed imported meat",
            signals:  signals(Meats, 4, false, false, false, false, false, true, false, true, 0, 0.9),
            expected: 8.0,
        },
        Scenario {
            name:     "dried lentils in recyclable pack",
            signals:  signals(Legumes, 1, false, false, false, true, false, false, true, false, 0, 0.1),
            expected: 85.0,
        },
        Scenario {
            name:     "fair-trade coffee, imported",
            signals:  signals(Beverages, 3, true, true, false, true, true, false, false, true, 2, 0.5),
            expected: 55.0,
        },
        Scenario {
            name:     "cheese, local, plastic wrap",
            signals:  signals(Dairy, 3, false, false, false, false, false, true, true, false, 0, 0.55),
            expected: 35.0,
        },
        Scenario {
            name:     "frozen ready meal",
            signals:  signals(ReadyMeals, 4, false, false, false, false, false, true, false, false, 0, 0.85),
            expected: 28.0,
        },
        Scenario {
            name:     "chocolate bar, imported",
            signals:  signals(Sweets, 4, false, false, false, false, false, true, false, true, 0, 0.8),
            expected: 22.0,
        },
        Scenario {
            name:     "olive oil in glass, organic",
            signals:  signals(FatsAndOils, 2, true, false, false, true, true, false, true, false, 1, 0.3),
            expected: 68.0,
        },
    ]
}

// ─── Evaluation ───────────────────────────────────────────────────────────────
pub fn evaluate<B: Backend>(
    model:     &EcoScoreModel<B>,
    scenarios: &[Scenario],
    device:    &B::Device,
) -> Result<EvaluationReport> {
    let features: Vec<_> = scenarios.iter().map(|s| encode(&s.signals)).collect();
    let predicted = model.predict_scores(&features, device)?;

    let results: Vec<ScenarioResult> = scenarios
        .iter()
        .zip(predicted)
        .map(|(s, p)| ScenarioResult { name: s.name, expected: s.expected, predicted: p })
        .collect();

    let mae = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.abs_error() as f64).sum::<f64>() / results.len() as f64
    };

    tracing::debug!("Evaluated {} scenarios, MAE {:.2}", results.len(), mae);
    Ok(EvaluationReport { results, mae })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::EcoScoreConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_scenarios_encode_cleanly() {
        let all = scenarios();
        assert!(all.len() >= 2);
        for s in &all {
            assert!((0.0..=100.0).contains(&s.expected));
            assert!(encode(&s.signals).as_slice().iter().all(|x| (0.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_mae_matches_rows() {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let model = EcoScoreConfig::new().init::<NdArray>(&device);
        let report = evaluate(&model, &scenarios(), &device).unwrap();
        assert_eq!(report.results.len(), scenarios().len());

        let manual: f64 = report.results.iter().map(|r| r.abs_error() as f64).sum::<f64>()
            / report.results.len() as f64;
        assert!((report.mae - manual).abs() < 1e-9);
        assert!(report.to_string().contains("MAE"));
    }

    #[test]
    fn test_empty_set_has_zero_mae() {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let model = EcoScoreConfig::new().init::<NdArray>(&device);
        assert_eq!(evaluate(&model, &[], &device).unwrap().mae, 0.0);
    }
}
