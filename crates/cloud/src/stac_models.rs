//! STAC (SpatioTemporal Asset Catalog) data types.
//!
//! Serde models for STAC Item Search (POST /search) requests and responses,
//! limited to what scene lookup needs: bbox, datetime and collection
//! filters, pagination links, acquisition dates and asset hrefs.

use chrono::NaiveDate;
use litterscope_core::{BBox, DateWindow, parse_date};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Search request ────────────────────────────────────────────────────

/// Body for `POST /search` (STAC API – Item Search).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StacSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Pagination token (next page).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl StacSearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to items intersecting `bbox`.
    pub fn bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox.to_array().to_vec());
        self
    }

    /// Set a raw datetime or datetime range (e.g. `"2024-06-01/2024-06-30"`).
    pub fn datetime(mut self, dt: impl Into<String>) -> Self {
        self.datetime = Some(dt.into());
        self
    }

    /// Datetime range covering the half-open window `[start, end)`:
    /// from the first second of `start` to the last second before `end`.
    pub fn window(self, window: &DateWindow) -> Self {
        let last_day = window.end.pred_opt().unwrap_or(window.start);
        self.datetime(format!(
            "{}T00:00:00Z/{}T23:59:59Z",
            window.start.format("%Y-%m-%d"),
            last_day.format("%Y-%m-%d")
        ))
    }

    pub fn collection(mut self, id: &str) -> Self {
        self.collections = Some(vec![id.to_string()]);
        self
    }

    /// Maximum items per page.
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }
}

// ─── Response types ────────────────────────────────────────────────────

/// A STAC Item Collection (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<StacItem>,

    #[serde(default)]
    pub links: Vec<StacLink>,

    #[serde(rename = "numberMatched", skip_serializing_if = "Option::is_none")]
    pub number_matched: Option<u64>,
}

impl StacItemCollection {
    /// The `"next"` pagination link, if any.
    pub fn next_link(&self) -> Option<&StacLink> {
        self.links.iter().find(|l| l.rel == "next")
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A single STAC Item (GeoJSON Feature).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItem {
    pub id: String,

    /// `[west, south, east, north]`, or the 3D form with elevations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    pub properties: StacItemProperties,

    #[serde(default)]
    pub assets: HashMap<String, StacAsset>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl StacItem {
    pub fn asset(&self, key: &str) -> Option<&StacAsset> {
        self.assets.get(key)
    }

    /// Calendar date of acquisition, taken from `datetime` or, for items
    /// that only carry a range, `start_datetime`.
    pub fn acquired(&self) -> Option<NaiveDate> {
        let stamp = self.properties.datetime.as_deref().or_else(|| {
            self.properties
                .extra
                .get("start_datetime")
                .and_then(|v| v.as_str())
        })?;
        parse_date(stamp.get(..10)?).ok()
    }

    /// Footprint bounding box, if the item has a usable one.
    pub fn bounds(&self) -> Option<BBox> {
        match self.bbox.as_deref()? {
            [w, s, e, n] => Some(BBox::new(*w, *s, *e, *n)),
            [w, s, _, e, n, _] => Some(BBox::new(*w, *s, *e, *n)),
            _ => None,
        }
    }
}

/// STAC Item properties.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemProperties {
    /// ISO 8601 datetime; null when the item uses a start/end range.
    #[serde(default)]
    pub datetime: Option<String>,

    #[serde(rename = "eo:cloud_cover", skip_serializing_if = "Option::is_none")]
    pub eo_cloud_cover: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A single STAC Asset (file reference).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacAsset {
    pub href: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

/// A STAC Link (used for pagination).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacLink {
    /// Relationship: `"self"`, `"root"`, `"next"`, `"prev"`, etc.
    pub rel: String,

    pub href: String,

    /// HTTP method for the link (default GET, but `"next"` often uses POST).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request body for POST-based pagination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,

    /// If true, `body` is merged over the previous request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
}

impl StacLink {
    pub fn is_post(&self) -> bool {
        self.method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("POST"))
    }
}
