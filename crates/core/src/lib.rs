//! # LitterScope Core
//!
//! Core types for browsing precomputed marine-litter detections.
//!
//! This crate provides:
//! - `Raster`: georeferenced `f64` grid with NaN as no-data
//! - GeoTIFF reading and writing for litter masks
//! - `RegionCatalog`: the static region/date/mask configuration
//! - `DateWindow`: the adjacent-day imagery window around a date
//! - `MaskSource` and `ImageryService`: seams to the mask store and the
//!   satellite catalogue
//! - `Image`: lazy raster expressions and their local evaluator

pub mod catalog;
pub mod dates;
pub mod error;
pub mod geometry;
pub mod image;
pub mod imagery;
pub mod io;
pub mod mask;
pub mod raster;

pub use catalog::{Anchor, Region, RegionCatalog};
pub use dates::{DateWindow, parse_date, resolve_window};
pub use error::{Error, Result};
pub use geometry::{Aoi, BBox, LonLat};
pub use image::{Band, Bands, Image, PixelSource};
pub use imagery::{ImageryService, OfflineImagery, Scene, SceneCollection, SceneQuery};
pub use mask::{GeoTiffMaskStore, MaskRef, MaskSource, MemoryMaskStore};
pub use raster::{GeoTransform, Raster, RasterStatistics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{Anchor, Region, RegionCatalog};
    pub use crate::dates::DateWindow;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Aoi, LonLat};
    pub use crate::image::{Image, PixelSource};
    pub use crate::imagery::{ImageryService, SceneCollection, SceneQuery};
    pub use crate::mask::{MaskRef, MaskSource};
    pub use crate::raster::Raster;
}
