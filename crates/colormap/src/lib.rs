//! # LitterScope Colormap
//!
//! Palettes and raster-to-RGBA rendering for map layers.
//!
//! Layers are styled the way the map widget expects: a palette given as CSS
//! color names or hex strings, stretched between a `min` and a `max`. The
//! main entry points are [`raster_to_rgba`] for single-band layers and
//! [`composite_to_rgba`] for true-colour composites.
//!
//! ## Usage
//!
//! ```ignore
//! use litterscope_colormap::{ColormapParams, Palette, raster_to_rgba};
//!
//! let palette = Palette::from_names(&["green", "red"])?;
//! let rgba = raster_to_rgba(&mask, &ColormapParams::new(palette, 0.0, 237.0));
//! ```

mod palette;
mod render;

pub use palette::{ColorStop, Palette, PaletteError, Rgb, parse_color};
pub use render::{ColormapParams, composite_to_rgba, raster_to_rgba};
