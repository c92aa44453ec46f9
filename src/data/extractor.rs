// ============================================================
// Layer 4: Page Validator / Extractor
// ============================================================
// Turns one page of raw CatalogRecords into CanonicalProducts.
//
// A record is kept only if ALL of these hold:
//   1. it has a non-empty `code` (needed for deduplication)
//   2. `product_name` is non-empty after trimming
//   3. at least one category tag is present
//   4. `ecoscore_grade` is one of a..e (any case)
//   5. `ecoscore_score` is a number in [0, 100]
//
// Everything else is dropped silently. Rejections are not
// errors; they only show up in the page yield statistics.
// This module is pure: no I/O, no logging, never fails.

use crate::domain::category::Category;
use crate::domain::product::{CanonicalProduct, CatalogRecord, Grade};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Substitute `Grade::fallback_score` when the numeric score is absent.
    /// A present-but-out-of-range score is still rejected.
    pub fill_missing_scores: bool,
}

/// Validate every record on a page, keeping page order.
pub fn extract_page(records: &[CatalogRecord], opts: ExtractOptions) -> Vec<CanonicalProduct> {
    records.iter().filter_map(|r| extract(r, opts)).collect()
}

/// Validate and project a single record.
pub fn extract(record: &CatalogRecord, opts: ExtractOptions) -> Option<CanonicalProduct> {
    let code = non_empty(record.code.as_deref())?;
    let name = non_empty(record.product_name.as_deref())?;

    if record.categories_tags.is_empty() {
        return None;
    }

    let grade = Grade::parse(record.ecoscore_grade.as_deref()?)?;

    let score = match record.ecoscore_score {
        Some(s) if (0.0..=100.0).contains(&s) => s,
        Some(_) => return None,
        None if opts.fill_missing_scores => grade.fallback_score(),
        None => return None,
    };

    Some(CanonicalProduct {
        code,
        name,
        categories: record.categories_tags.clone(),
        category: Category::from_tags(record.categories_tags.as_slice()),
        origins: record.origins.as_deref().unwrap_or("").trim().to_string(),
        origins_tags: record.origins_tags.clone(),
        packaging: record.packaging_tags.clone(),
        labels: record.labels_tags.clone(),
        nova_group: record.nova_group.and_then(nova_group),
        nutriscore_grade: record
            .nutriscore_grade
            .as_deref()
            .and_then(|g| non_empty(Some(g)))
            .map(|g| g.to_ascii_lowercase()),
        ingredients_analysis: record.ingredients_analysis_tags.clone(),
        ecoscore_score: score,
        ecoscore_grade: grade,
    })
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// NOVA groups are 1..=4; anything else is treated as unknown.
fn nova_group(raw: f64) -> Option<u8> {
    let rounded = raw.round();
    (1.0..=4.0).contains(&rounded).then_some(rounded as u8)
}
