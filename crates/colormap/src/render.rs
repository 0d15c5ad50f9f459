//! Raster-to-RGBA rendering.

use crate::palette::{Palette, Rgb};
use litterscope_core::Raster;
use litterscope_core::error::{Error, Result};

/// Parameters for single-band rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    pub palette: Palette,
    /// Value mapped to the first palette color. Values below are clamped.
    pub min: f64,
    /// Value mapped to the last palette color. Values above are clamped.
    pub max: f64,
    /// Color for nodata pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    pub fn new(palette: Palette, min: f64, max: f64) -> Self {
        Self {
            palette,
            min,
            max,
            nodata_color: [0, 0, 0, 0],
        }
    }
}

/// Position of `v` within `[min, max]`, unclamped.
fn normalize(v: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.abs() > f64::EPSILON { (v - min) / range } else { v - min }
}

/// Convert a raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order,
/// suitable for uploading as a GPU texture. NaN pixels get
/// `params.nodata_color`.
pub fn raster_to_rgba(raster: &Raster, params: &ColormapParams) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(raster.len() * 4);

    for &v in raster.data().iter() {
        if v.is_finite() {
            let Rgb { r, g, b } = params.palette.evaluate(normalize(v, params.min, params.max));
            rgba.extend_from_slice(&[r, g, b, 255]);
        } else {
            rgba.extend_from_slice(&params.nodata_color);
        }
    }

    rgba
}

/// Convert three bands to an RGBA buffer, stretching each between `min` and
/// `max`. A pixel that is no-data in any band is transparent.
pub fn composite_to_rgba(
    red: &Raster,
    green: &Raster,
    blue: &Raster,
    min: f64,
    max: f64,
) -> Result<Vec<u8>> {
    for other in [green, blue] {
        if other.shape() != red.shape() {
            return Err(Error::SizeMismatch {
                er: red.rows(),
                ec: red.cols(),
                ar: other.rows(),
                ac: other.cols(),
            });
        }
    }

    let stretch = |v: f64| (normalize(v, min, max).clamp(0.0, 1.0) * 255.0).round() as u8;

    let mut rgba = Vec::with_capacity(red.len() * 4);
    let pixels = red
        .data()
        .iter()
        .zip(green.data().iter())
        .zip(blue.data().iter());
    for ((&r, &g), &b) in pixels {
        if r.is_finite() && g.is_finite() && b.is_finite() {
            rgba.extend_from_slice(&[stretch(r), stretch(g), stretch(b), 255]);
        } else {
            rgba.extend_from_slice(&[0, 0, 0, 0]);
        }
    }
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_to_rgba_basic() {
        let r = Raster::from_vec(vec![0.0, 118.5, 237.0, f64::NAN], 2, 2).unwrap();
        let params = ColormapParams::new(Palette::from_names(&["green", "red"]).unwrap(), 0.0, 237.0);
        let rgba = raster_to_rgba(&r, &params);

        assert_eq!(rgba.len(), 16); // 4 pixels * 4 bytes

        // min -> green, opaque
        assert_eq!(&rgba[0..4], &[0, 128, 0, 255]);
        // midpoint
        assert_eq!(&rgba[4..8], &[128, 64, 0, 255]);
        // max -> red
        assert_eq!(&rgba[8..12], &[255, 0, 0, 255]);
        // NaN -> transparent
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn empty_raster_renders_nothing() {
        let params = ColormapParams::new(Palette::grayscale(), 0.0, 1.0);
        assert!(raster_to_rgba(&Raster::empty(), &params).is_empty());
    }

    #[test]
    fn composite_stretches_and_masks() {
        let red = Raster::from_vec(vec![0.4, 0.2], 1, 2).unwrap();
        let green = Raster::from_vec(vec![0.0, f64::NAN], 1, 2).unwrap();
        let blue = Raster::from_vec(vec![0.8, 0.1], 1, 2).unwrap();

        let rgba = composite_to_rgba(&red, &green, &blue, 0.0, 0.4).unwrap();
        assert_eq!(&rgba[0..4], &[255, 0, 255, 255]);
        assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn composite_rejects_mismatched_bands() {
        let a = Raster::filled(2, 2, 0.1);
        let b = Raster::filled(1, 2, 0.1);
        assert!(composite_to_rgba(&a, &a, &b, 0.0, 0.4).is_err());
    }
}
