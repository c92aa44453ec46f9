// ============================================================
// Layer 3: Product Domain Types
// ============================================================
// Two shapes of the same product:
//
//   CatalogRecord     what the remote catalog sends us.
//                     Every field optional, nothing trusted.
//
//   CanonicalProduct  what survives validation. Every field
//                     present (possibly empty), score in
//                     [0, 100], grade in a..e.
//
// The conversion between them lives in data::extractor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::lenient;

// ─── Grade ────────────────────────────────────────────────────────────────────
/// Letter eco-grade, best (A) to worst (E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E];

    /// Case-insensitive parse; "unknown", "not-applicable" etc. yield `None`.
    pub fn parse(raw: &str) -> Option<Grade> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Grade::A),
            "b" => Some(Grade::B),
            "c" => Some(Grade::C),
            "d" => Some(Grade::D),
            "e" => Some(Grade::E),
            _ => None,
        }
    }

    /// Score bands: ≥80 A, ≥60 B, ≥40 C, ≥20 D, else E.
    pub fn from_score(score: f32) -> Grade {
        match score {
            s if s >= 80.0 => Grade::A,
            s if s >= 60.0 => Grade::B,
            s if s >= 40.0 => Grade::C,
            s if s >= 20.0 => Grade::D,
            _ => Grade::E,
        }
    }

    /// Substitute score for records that carry a grade but no number.
    /// Only used when mining with score filling switched on.
    pub fn fallback_score(self) -> f64 {
        match self {
            Grade::A => 85.0,
            Grade::B => 65.0,
            Grade::C => 45.0,
            Grade::D => 25.0,
            Grade::E => 10.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "a",
            Grade::B => "b",
            Grade::C => "c",
            Grade::D => "d",
            Grade::E => "e",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── GradeHistogram ───────────────────────────────────────────────────────────
/// Running per-grade counts. Serialises as `{"a": n, ..., "e": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeHistogram {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub e: usize,
}

impl GradeHistogram {
    pub fn record(&mut self, grade: Grade) {
        *self.slot(grade) += 1;
    }

    pub fn count(&self, grade: Grade) -> usize {
        match grade {
            Grade::A => self.a,
            Grade::B => self.b,
            Grade::C => self.c,
            Grade::D => self.d,
            Grade::E => self.e,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c + self.d + self.e
    }

    fn slot(&mut self, grade: Grade) -> &mut usize {
        match grade {
            Grade::A => &mut self.a,
            Grade::B => &mut self.b,
            Grade::C => &mut self.c,
            Grade::D => &mut self.d,
            Grade::E => &mut self.e,
        }
    }
}

impl fmt::Display for GradeHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A:{} B:{} C:{} D:{} E:{}",
            self.a, self.b, self.c, self.d, self.e
        )
    }
}

// ─── CatalogRecord ────────────────────────────────────────────────────────────
/// One raw product as returned by the catalog search endpoint.
/// Field names follow the remote API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub product_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub categories_tags: Vec<String>,

    /// Free-text origin, e.g. "France, Spain"
    #[serde(default, deserialize_with = "lenient::text")]
    pub origins: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub origins_tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub packaging_tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub nova_group: Option<f64>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub labels_tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub ecoscore_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub ecoscore_grade: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nutriscore_grade: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub ingredients_analysis_tags: Vec<String>,
}

impl CatalogRecord {
    /// Decode one element of a page's `products` array.
    /// Anything that is not an object becomes an empty record,
    /// which validation then rejects.
    pub fn from_value(value: serde_json::Value) -> CatalogRecord {
        serde_json::from_value(value).unwrap_or_default()
    }
}

// ─── CanonicalProduct ─────────────────────────────────────────────────────────
/// A validated, schema-complete product. Build one through
/// `data::extractor`; there is no way to mutate it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProduct {
    pub code: String,
    pub name: String,
    pub categories: Vec<String>,
    pub category: Category,
    pub origins: String,
    pub origins_tags: Vec<String>,
    pub packaging: Vec<String>,
    pub labels: Vec<String>,
    pub nova_group: Option<u8>,
    pub nutriscore_grade: Option<String>,
    pub ingredients_analysis: Vec<String>,
    pub ecoscore_score: f64,
    pub ecoscore_grade: Grade,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grade_parse_is_case_insensitive() {
        assert_eq!(Grade::parse("A"), Some(Grade::A));
        assert_eq!(Grade::parse(" e "), Some(Grade::E));
        assert_eq!(Grade::parse("unknown"), None);
        assert_eq!(Grade::parse("f"), None);
    }

    #[test]
    fn test_grade_from_score_bands() {
        assert_eq!(Grade::from_score(95.0), Grade::A);
        assert_eq!(Grade::from_score(80.0), Grade::A);
        assert_eq!(Grade::from_score(79.9), Grade::B);
        assert_eq!(Grade::from_score(40.0), Grade::C);
        assert_eq!(Grade::from_score(20.0), Grade::D);
        assert_eq!(Grade::from_score(3.0), Grade::E);
    }

    #[test]
    fn test_histogram_counts() {
        let mut h = GradeHistogram::default();
        h.record(Grade::A);
        h.record(Grade::A);
        h.record(Grade::D);
        assert_eq!(h.count(Grade::A), 2);
        assert_eq!(h.count(Grade::D), 1);
        assert_eq!(h.total(), 3);
        assert_eq!(serde_json::to_value(h).unwrap(), json!({"a":2,"b":0,"c":0,"d":1,"e":0}));
    }

    #[test]
    fn test_record_tolerates_malformed_fields() {
        let raw = json!({
            "code": 3017620422003u64,
            "product_name": "Spread",
            "categories_tags": ["en:spreads", 12, null],
            "nova_group": "4",
            "ecoscore_score": "not a number",
            "labels_tags": {"unexpected": true},
        });
        let rec = CatalogRecord::from_value(raw);
        assert_eq!(rec.code.as_deref(), Some("3017620422003"));
        assert_eq!(rec.categories_tags, vec!["en:spreads".to_string()]);
        assert_eq!(rec.nova_group, Some(4.0));
        assert_eq!(rec.ecoscore_score, None);
        assert!(rec.labels_tags.is_empty());
    }

    #[test]
    fn test_non_object_record_becomes_empty() {
        let rec = CatalogRecord::from_value(json!("garbage"));
        assert!(rec.code.is_none());
        assert!(rec.categories_tags.is_empty());
    }
}
