//! Async STAC client for Item Search.
//!
//! Supports Earth Search and Planetary Computer out of the box, plus any
//! STAC API endpoint via [`StacCatalog::Custom`]. Transient failures (network
//! errors, HTTP 429 and 5xx) are retried with exponential backoff.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{CloudError, Result};
use crate::stac_models::{StacItem, StacItemCollection, StacLink, StacSearchParams};

// ─── Catalog ───────────────────────────────────────────────────────────

/// Well-known STAC catalogs plus custom endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StacCatalog {
    /// AWS Earth Search (Element 84).
    #[default]
    EarthSearch,
    /// Microsoft Planetary Computer STAC API.
    PlanetaryComputer,
    /// Any STAC API root URL, e.g. `https://my-stac.example.com/api/v1`.
    Custom(String),
}

impl StacCatalog {
    /// Full POST `/search` URL.
    pub fn search_url(&self) -> String {
        match self {
            Self::EarthSearch => "https://earth-search.aws.element84.com/v1/search".to_string(),
            Self::PlanetaryComputer => {
                "https://planetarycomputer.microsoft.com/api/stac/v1/search".to_string()
            }
            Self::Custom(base) => {
                let base = base.trim_end_matches('/');
                if base.ends_with("/search") {
                    base.to_string()
                } else {
                    format!("{base}/search")
                }
            }
        }
    }

    /// Parse `"es"`, `"earth-search"`, `"pc"` or `"planetary-computer"`;
    /// anything else is taken as a custom URL.
    pub fn from_str_or_url(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "es" | "earth-search" | "earthsearch" => Self::EarthSearch,
            "pc" | "planetary-computer" | "planetarycomputer" => Self::PlanetaryComputer,
            _ => Self::Custom(s.to_string()),
        }
    }
}

// ─── Options ───────────────────────────────────────────────────────────

/// Configuration for [`StacClient`].
#[derive(Debug, Clone)]
pub struct StacClientOptions {
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Retries after the first attempt on transient failures (default 3).
    pub max_retries: u32,
    /// First backoff delay; doubled on each retry (default 500 ms).
    pub retry_backoff: Duration,
    /// Maximum total items to fetch across pages (default 200).
    pub max_items: usize,
}

impl Default for StacClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            max_items: 200,
        }
    }
}

// ─── Client ────────────────────────────────────────────────────────────

/// Async client for STAC Item Search.
pub struct StacClient {
    catalog: StacCatalog,
    client: reqwest::Client,
    options: StacClientOptions,
}

impl StacClient {
    pub fn new(catalog: StacCatalog, options: StacClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .user_agent(concat!("litterscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CloudError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            catalog,
            client,
            options,
        })
    }

    pub fn catalog(&self) -> &StacCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &StacClientOptions {
        &self.options
    }

    /// One page of results.
    pub async fn search(&self, params: &StacSearchParams) -> Result<StacItemCollection> {
        let url = self.catalog.search_url();
        self.with_retry(|| self.client.post(&url).json(params)).await
    }

    /// Follow `next` links until the catalog runs out of pages or
    /// `max_items` items have been collected.
    pub async fn search_all(&self, params: &StacSearchParams) -> Result<Vec<StacItem>> {
        let max = self.options.max_items;
        let mut items: Vec<StacItem> = Vec::new();
        let mut page = self.search(params).await?;
        let mut pages = 1usize;

        loop {
            let next = page.next_link().cloned();
            items.append(&mut page.features);

            if items.len() >= max {
                break;
            }
            let Some(link) = next else { break };

            page = self.follow_next(&link, params).await?;
            pages += 1;
            if page.is_empty() {
                break;
            }
        }

        items.truncate(max);
        debug!(items = items.len(), pages, "STAC search complete");
        Ok(items)
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Send the request built by `make`, retrying transient failures.
    async fn with_retry<F>(&self, make: F) -> Result<StacItemCollection>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match self.send_once(make()).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let delay = backoff_delay(self.options.retry_backoff, attempt);
                    attempt += 1;
                    warn!(attempt, ?delay, error = %e, "STAC request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, request: reqwest::RequestBuilder) -> Result<StacItemCollection> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(CloudError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }
        serde_json::from_str(&body).map_err(|e| CloudError::Parse(e.to_string()))
    }

    /// Follow a pagination link, POST (optionally merged) or GET.
    async fn follow_next(
        &self,
        link: &StacLink,
        original: &StacSearchParams,
    ) -> Result<StacItemCollection> {
        if link.is_post() {
            let body = next_page_body(link, original)?;
            self.with_retry(|| self.client.post(&link.href).json(&body))
                .await
        } else {
            self.with_retry(|| self.client.get(&link.href)).await
        }
    }
}

/// Request body for a POST `next` link.
fn next_page_body(link: &StacLink, original: &StacSearchParams) -> Result<serde_json::Value> {
    let original =
        serde_json::to_value(original).map_err(|e| CloudError::Parse(e.to_string()))?;

    let body = match (&link.body, link.merge.unwrap_or(false)) {
        (Some(extra), true) => {
            let mut merged = original;
            if let (Some(base), Some(extra)) = (merged.as_object_mut(), extra.as_object()) {
                for (k, v) in extra {
                    base.insert(k.clone(), v.clone());
                }
            }
            merged
        }
        (Some(body), false) => body.clone(),
        (None, _) => original,
    };
    Ok(body)
}

/// `base * 2^attempt`, saturating instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_saturates() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 0), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
        assert_eq!(backoff_delay(Duration::MAX, 2), Duration::MAX);
    }

    #[test]
    fn catalog_search_urls() {
        assert_eq!(
            StacCatalog::EarthSearch.search_url(),
            "https://earth-search.aws.element84.com/v1/search"
        );
        assert_eq!(
            StacCatalog::PlanetaryComputer.search_url(),
            "https://planetarycomputer.microsoft.com/api/stac/v1/search"
        );
        for base in [
            "https://example.com/stac",
            "https://example.com/stac/",
            "https://example.com/stac/search",
        ] {
            assert_eq!(
                StacCatalog::Custom(base.into()).search_url(),
                "https://example.com/stac/search"
            );
        }
    }

    #[test]
    fn catalog_from_str_or_url() {
        assert_eq!(StacCatalog::from_str_or_url("ES"), StacCatalog::EarthSearch);
        assert_eq!(
            StacCatalog::from_str_or_url("pc"),
            StacCatalog::PlanetaryComputer
        );
        assert_eq!(
            StacCatalog::from_str_or_url("https://My-Stac.com"),
            StacCatalog::Custom("https://My-Stac.com".into())
        );
    }

    fn link(body: Option<serde_json::Value>, merge: Option<bool>) -> StacLink {
        StacLink {
            rel: "next".into(),
            href: "https://example.com/search".into(),
            method: Some("POST".into()),
            body,
            merge,
        }
    }

    #[test]
    fn merged_next_body_keeps_original_filters() {
        let original = StacSearchParams::new().collection("sentinel-2-l2a").limit(10);
        let body = next_page_body(
            &link(Some(serde_json::json!({"token": "next:abc"})), Some(true)),
            &original,
        )
        .unwrap();
        assert_eq!(body["token"], "next:abc");
        assert_eq!(body["collections"], serde_json::json!(["sentinel-2-l2a"]));
        assert_eq!(body["limit"], 10);
    }

    #[test]
    fn unmerged_next_body_replaces_original() {
        let original = StacSearchParams::new().limit(10);
        let body = next_page_body(
            &link(Some(serde_json::json!({"token": "t"})), None),
            &original,
        )
        .unwrap();
        assert_eq!(body, serde_json::json!({"token": "t"}));

        let body = next_page_body(&link(None, None), &original).unwrap();
        assert_eq!(body["limit"], 10);
    }
}
