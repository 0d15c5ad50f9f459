//! Seam to the satellite-imagery catalogue.
//!
//! The compositor asks an [`ImageryService`] for the scenes that intersect an
//! area of interest inside a date window, restricted to a set of bands. What
//! comes back is a description of the scenes; pixels are only fetched when an
//! expression over them is evaluated.

use crate::dates::DateWindow;
use crate::error::Result;
use crate::geometry::{Aoi, BBox};
use crate::image::Image;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::future::Future;

/// Filter for a scene search.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneQuery {
    /// Collection identifier, e.g. `sentinel-2-l2a`
    pub collection: String,
    pub aoi: Aoi,
    pub window: DateWindow,
    pub bands: Vec<String>,
}

/// A single acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub acquired: NaiveDate,
    pub bbox: Option<BBox>,
    /// Requested band name to asset href
    pub assets: BTreeMap<String, String>,
}

/// Scenes matching a [`SceneQuery`], with the bands they were selected for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneCollection {
    pub bands: Vec<String>,
    pub scenes: Vec<Scene>,
}

impl SceneCollection {
    pub fn new(bands: Vec<String>, scenes: Vec<Scene>) -> Self {
        Self { bands, scenes }
    }

    /// A collection with no scenes for the given bands
    pub fn empty(bands: Vec<String>) -> Self {
        Self::new(bands, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Per-pixel mean over all scenes.
    pub fn mean(self) -> Image {
        Image::Mean(self)
    }
}

/// A catalogue that can be searched for scenes.
pub trait ImageryService {
    fn search(&self, query: &SceneQuery)
    -> impl Future<Output = Result<SceneCollection>> + Send;
}

/// Imagery service that never finds anything.
///
/// Used when running without network access; every composite is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineImagery;

impl ImageryService for OfflineImagery {
    fn search(
        &self,
        query: &SceneQuery,
    ) -> impl Future<Output = Result<SceneCollection>> + Send {
        let bands = query.bands.clone();
        async move { Ok(SceneCollection::empty(bands)) }
    }
}
