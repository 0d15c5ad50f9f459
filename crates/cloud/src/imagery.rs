//! Sentinel-2 scene lookup over STAC.
//!
//! [`StacImagery`] implements [`ImageryService`]: it searches the catalog
//! with the AOI bbox and the window's datetime range, then keeps only items
//! that really fall inside the half-open window, overlap the AOI and carry
//! every requested band.

use std::collections::BTreeMap;
use std::future::Future;

use litterscope_core::error::Result as CoreResult;
use litterscope_core::{ImageryService, Scene, SceneCollection, SceneQuery};
use tracing::{debug, info};

use crate::error::Result;
use crate::stac_client::{StacCatalog, StacClient, StacClientOptions};
use crate::stac_models::{StacItem, StacSearchParams};

/// Band names and their common-name asset keys. Planetary Computer keys
/// Sentinel-2 assets by band (`B04`), Earth Search by common name (`red`).
const BAND_ALIASES: &[(&str, &str)] = &[
    ("B02", "blue"),
    ("B03", "green"),
    ("B04", "red"),
    ("B08", "nir"),
];

/// Asset keys to try, in order, for a requested band.
pub fn asset_keys(band: &str) -> Vec<&str> {
    let mut keys = vec![band];
    for (code, common) in BAND_ALIASES {
        if band.eq_ignore_ascii_case(code) {
            keys.push(common);
        } else if band.eq_ignore_ascii_case(common) {
            keys.push(code);
        }
    }
    keys
}

/// Configuration for [`StacImagery`].
#[derive(Debug, Clone)]
pub struct StacImageryOptions {
    /// Items requested per page (default 100).
    pub page_size: u32,
}

impl Default for StacImageryOptions {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// [`ImageryService`] backed by a STAC API.
pub struct StacImagery {
    client: StacClient,
    options: StacImageryOptions,
}

impl StacImagery {
    pub fn new(
        catalog: StacCatalog,
        client_options: StacClientOptions,
        options: StacImageryOptions,
    ) -> Result<Self> {
        Ok(Self::from_client(
            StacClient::new(catalog, client_options)?,
            options,
        ))
    }

    pub fn from_client(client: StacClient, options: StacImageryOptions) -> Self {
        Self { client, options }
    }

    pub fn catalog(&self) -> &StacCatalog {
        self.client.catalog()
    }

    /// Search body for a scene query.
    pub fn search_params(&self, query: &SceneQuery) -> StacSearchParams {
        StacSearchParams::new()
            .bbox(query.aoi.bbox())
            .window(&query.window)
            .collection(&query.collection)
            .limit(self.options.page_size)
    }

    async fn find(&self, query: &SceneQuery) -> Result<SceneCollection> {
        let params = self.search_params(query);
        let items = self.client.search_all(&params).await?;
        let found = items.len();

        let mut scenes: Vec<Scene> = items
            .iter()
            .filter_map(|item| item_to_scene(item, query))
            .collect();
        scenes.sort_by(|a, b| (a.acquired, &a.id).cmp(&(b.acquired, &b.id)));

        info!(
            collection = %query.collection,
            window = %query.window,
            found,
            kept = scenes.len(),
            "imagery search"
        );
        Ok(SceneCollection::new(query.bands.clone(), scenes))
    }
}

impl ImageryService for StacImagery {
    fn search(
        &self,
        query: &SceneQuery,
    ) -> impl Future<Output = CoreResult<SceneCollection>> + Send {
        async move { self.find(query).await.map_err(Into::into) }
    }
}

/// Turn a STAC item into a scene, or `None` when it does not satisfy the
/// query.
pub fn item_to_scene(item: &StacItem, query: &SceneQuery) -> Option<Scene> {
    let Some(acquired) = item.acquired() else {
        debug!(item = %item.id, "dropping item without a datetime");
        return None;
    };
    if !query.window.contains(acquired) {
        debug!(item = %item.id, %acquired, "dropping item outside the window");
        return None;
    }

    let bbox = item.bounds();
    if bbox.is_some_and(|b| !b.intersects(&query.aoi.bbox())) {
        debug!(item = %item.id, "dropping item outside the AOI");
        return None;
    }

    let mut assets = BTreeMap::new();
    for band in &query.bands {
        let href = asset_keys(band)
            .into_iter()
            .find_map(|key| item.asset(key))
            .map(|a| a.href.clone());
        match href {
            Some(href) => {
                assets.insert(band.clone(), href);
            }
            None => {
                debug!(item = %item.id, band = %band, "dropping item without band");
                return None;
            }
        }
    }

    Some(Scene {
        id: item.id.clone(),
        acquired,
        bbox,
        assets,
    })
}
