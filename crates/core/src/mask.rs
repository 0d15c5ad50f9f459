//! Precomputed litter-mask assets.
//!
//! A mask is a single-band raster of detection intensities produced by the
//! trained model. Regions refer to masks by an opaque [`MaskRef`]; a
//! [`MaskSource`] resolves the reference to its footprint and its pixels.

use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::io::read_geotiff;
use crate::raster::Raster;
use geo_types::Polygon;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Opaque identifier of a mask asset, e.g. `durban190424`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskRef(String);

impl MaskRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaskRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Resolves mask references to geometry and pixels.
pub trait MaskSource {
    /// Footprint polygon of the mask.
    fn geometry(&self, mask: &MaskRef) -> Result<Polygon<f64>>;

    /// Per-pixel detection intensities, NaN where the model produced nothing.
    fn intensities(&self, mask: &MaskRef) -> Result<Arc<Raster>>;
}

impl<M: MaskSource + ?Sized> MaskSource for Arc<M> {
    fn geometry(&self, mask: &MaskRef) -> Result<Polygon<f64>> {
        (**self).geometry(mask)
    }

    fn intensities(&self, mask: &MaskRef) -> Result<Arc<Raster>> {
        (**self).intensities(mask)
    }
}

fn footprint_of(raster: &Raster) -> Polygon<f64> {
    BBox::from_bounds(raster.bounds()).to_polygon()
}

const DEFAULT_CACHE_ENTRIES: usize = 16;

/// Masks stored as `<root>/<id>.tif` GeoTIFFs.
///
/// Decoded rasters are kept in a small LRU cache so that re-selecting a date
/// does not read the file again.
pub struct GeoTiffMaskStore {
    root: PathBuf,
    cache: Mutex<LruCache<MaskRef, Arc<Raster>>>,
}

impl GeoTiffMaskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_capacity(root, DEFAULT_CACHE_ENTRIES)
    }

    pub fn with_capacity(root: impl Into<PathBuf>, entries: usize) -> Self {
        let cap = NonZeroUsize::new(entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            root: root.into(),
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a mask reference
    pub fn path_for(&self, mask: &MaskRef) -> PathBuf {
        self.root.join(format!("{}.tif", mask.as_str()))
    }

    fn load(&self, mask: &MaskRef) -> Result<Arc<Raster>> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(mask) {
                return Ok(Arc::clone(hit));
            }
        }

        let path = self.path_for(mask);
        if !path.is_file() {
            return Err(Error::MaskNotFound(mask.to_string()));
        }
        debug!(mask = %mask, path = %path.display(), "reading mask GeoTIFF");
        let raster = Arc::new(read_geotiff(&path)?);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(mask.clone(), Arc::clone(&raster));
        }
        Ok(raster)
    }
}

impl MaskSource for GeoTiffMaskStore {
    fn geometry(&self, mask: &MaskRef) -> Result<Polygon<f64>> {
        let raster = self.load(mask)?;
        Ok(footprint_of(&raster))
    }

    fn intensities(&self, mask: &MaskRef) -> Result<Arc<Raster>> {
        self.load(mask)
    }
}

/// In-memory masks, used by tests and demos.
#[derive(Default, Clone)]
pub struct MemoryMaskStore {
    masks: HashMap<MaskRef, Arc<Raster>>,
}

impl MemoryMaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mask: impl Into<MaskRef>, raster: Raster) {
        self.masks.insert(mask.into(), Arc::new(raster));
    }

    pub fn with(mut self, mask: impl Into<MaskRef>, raster: Raster) -> Self {
        self.insert(mask, raster);
        self
    }
}

impl MaskSource for MemoryMaskStore {
    fn geometry(&self, mask: &MaskRef) -> Result<Polygon<f64>> {
        self.masks
            .get(mask)
            .map(|r| footprint_of(r))
            .ok_or_else(|| Error::MaskNotFound(mask.to_string()))
    }

    fn intensities(&self, mask: &MaskRef) -> Result<Arc<Raster>> {
        self.masks
            .get(mask)
            .cloned()
            .ok_or_else(|| Error::MaskNotFound(mask.to_string()))
    }
}
