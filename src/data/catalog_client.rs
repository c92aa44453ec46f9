// ============================================================
// Layer 4: Catalog HTTP Client
// ============================================================
// Fetches one page of the product catalog's v2 search API:
//
//   GET {base}/api/v2/search
//       ?sort_by=unique_scans_n     (most scanned first)
//       &page_size=100
//       &page=N
//       &fields=code,product_name,...
//
// The `fields` list keeps the payload down to what the
// extractor actually reads.
//
// Each attempt is a single blocking GET with a bounded
// timeout. Failures are classified into FetchError and the
// whole attempt (request + JSON decode) is retried by
// data::retry, so a truncated body gets another chance too.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::data::retry::{with_retry, RetryPolicy};
use crate::domain::product::CatalogRecord;
use crate::domain::traits::{CatalogSource, FetchError};

const USER_AGENT: &str = concat!("ecoscore-trainer/", env!("CARGO_PKG_VERSION"));

/// Fields requested from the catalog, in request order.
pub const CATALOG_FIELDS: [&str; 12] = [
    "code",
    "product_name",
    "categories_tags",
    "ecoscore_score",
    "ecoscore_grade",
    "nova_group",
    "labels_tags",
    "packaging_tags",
    "origins",
    "origins_tags",
    "ingredients_analysis_tags",
    "nutriscore_grade",
];

// ─── CatalogQuery ─────────────────────────────────────────────────────────────
/// Everything about the request except the page number.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub base_url:  String,
    pub sort_by:   String,
    pub page_size: u32,
}

impl CatalogQuery {
    pub fn new(base_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            base_url:  base_url.into(),
            sort_by:   "unique_scans_n".to_string(),
            page_size,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/v2/search", self.base_url.trim_end_matches('/'))
    }

    /// Fully formed URL for one page.
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let fields = CATALOG_FIELDS.join(",");
        let page_size = self.page_size.to_string();
        let page = page.to_string();
        Url::parse_with_params(
            &self.endpoint(),
            &[
                ("sort_by", self.sort_by.as_str()),
                ("page_size", page_size.as_str()),
                ("page", page.as_str()),
                ("fields", fields.as_str()),
            ],
        )
        .with_context(|| format!("invalid catalog base URL '{}'", self.base_url))
    }
}

// ─── Response shape ───────────────────────────────────────────────────────────
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    products: Option<Vec<Value>>,
}

/// Decode a search response body into raw records.
/// A missing or null `products` array means an empty page.
pub fn parse_page(body: Value, url: &str) -> Result<Vec<CatalogRecord>, FetchError> {
    let page: SearchPage = serde_json::from_value(body).map_err(|e| FetchError::Decode {
        url:    url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(page
        .products
        .unwrap_or_default()
        .into_iter()
        .map(CatalogRecord::from_value)
        .collect())
}

// ─── CatalogClient ────────────────────────────────────────────────────────────
/// Blocking HTTP client for the catalog search endpoint.
pub struct CatalogClient {
    client: Client,
    query:  CatalogQuery,
    retry:  RetryPolicy,
}

impl CatalogClient {
    pub fn new(query: CatalogQuery, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build catalog HTTP client")?;
        Ok(Self { client, query, retry })
    }

    /// One GET, no retries.
    fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        let url_str = url.to_string();
        let resp = self.client.get(url.clone()).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url_str.clone() }
            } else {
                FetchError::Transport { url: url_str.clone(), reason: e.to_string() }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url_str, status: status.as_u16() });
        }

        resp.json::<Value>().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url_str.clone() }
            } else {
                FetchError::Decode { url: url_str.clone(), reason: e.to_string() }
            }
        })
    }
}

impl CatalogSource for CatalogClient {
    fn fetch_page(&self, page: u32) -> Result<Vec<CatalogRecord>, FetchError> {
        let url = self.query.page_url(page).map_err(|e| FetchError::Transport {
            url:    self.query.endpoint(),
            reason: format!("{e:#}"),
        })?;
        let url_str = url.to_string();

        with_retry(&self.retry, |attempt| {
            tracing::debug!("GET page {} (attempt {})", page, attempt);
            let body = self.get_json(&url)?;
            parse_page(body, &url_str)
        })
    }

    fn describe(&self) -> String {
        format!("{} (sort_by={})", self.query.endpoint(), self.query.sort_by)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_url_carries_all_parameters() {
        let q   = CatalogQuery::new("https://world.openfoodfacts.org/", 100);
        let url = q.page_url(7).unwrap();
        assert_eq!(url.path(), "/api/v2/search");

        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(params.contains(&("sort_by".into(), "unique_scans_n".into())));
        assert!(params.contains(&("page_size".into(), "100".into())));
        assert!(params.contains(&("page".into(), "7".into())));
        let fields = params.iter().find(|(k, _)| k == "fields").unwrap();
        assert!(fields.1.starts_with("code,product_name,categories_tags"));
        assert_eq!(fields.1.split(',').count(), CATALOG_FIELDS.len());
    }

    #[test]
    fn test_parse_page_reads_products() {
        let body = json!({"count": 2, "products": [{"code": "1"}, {"code": "2"}]});
        let records = parse_page(body, "u").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].code.as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_products_is_empty_page() {
        assert!(parse_page(json!({"count": 0}), "u").unwrap().is_empty());
        assert!(parse_page(json!({"products": null}), "u").unwrap().is_empty());
    }

    #[test]
    fn test_non_object_body_is_decode_error() {
        let err = parse_page(json!([1, 2, 3]), "u").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
