//! Lazy raster expressions.
//!
//! Layers are described, not computed: an [`Image`] is a small expression tree
//! over scene collections and masks. Two layers built from the same inputs
//! compare equal, and whichever surface displays a layer decides when (and
//! whether) to evaluate it against a [`PixelSource`].

use crate::error::{Error, Result};
use crate::geometry::{Aoi, LonLat};
use crate::imagery::{Scene, SceneCollection};
use crate::mask::{GeoTiffMaskStore, MaskRef, MaskSource, MemoryMaskStore};
use crate::raster::Raster;
use std::fmt;
use std::sync::Arc;

/// Band name given to single-band mask rasters
pub const MASK_BAND: &str = "b1";

#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    /// Per-pixel mean of every scene, band by band
    Mean(SceneCollection),
    Divide(Box<Image>, f64),
    /// Mask out pixels whose centre lies outside the AOI
    Clip(Box<Image>, Aoi),
    /// Intensities of a precomputed litter mask
    Mask(MaskRef),
    /// 1 where the value exceeds the threshold, 0 otherwise
    GreaterThan(Box<Image>, f64),
    /// Mask out pixels where `mask` is 0 or no-data
    UpdateMask { image: Box<Image>, mask: Box<Image> },
}

impl Image {
    pub fn mask(mask: MaskRef) -> Self {
        Image::Mask(mask)
    }

    pub fn divide(self, divisor: f64) -> Self {
        Image::Divide(Box::new(self), divisor)
    }

    pub fn clip(self, aoi: Aoi) -> Self {
        Image::Clip(Box::new(self), aoi)
    }

    pub fn gt(self, threshold: f64) -> Self {
        Image::GreaterThan(Box::new(self), threshold)
    }

    pub fn update_mask(self, mask: Image) -> Self {
        Image::UpdateMask {
            image: Box::new(self),
            mask: Box::new(mask),
        }
    }

    /// Band names this expression produces
    pub fn band_names(&self) -> Vec<String> {
        match self {
            Image::Mean(collection) => collection.bands.clone(),
            Image::Mask(_) => vec![MASK_BAND.to_string()],
            Image::Divide(inner, _) | Image::Clip(inner, _) | Image::GreaterThan(inner, _) => {
                inner.band_names()
            }
            Image::UpdateMask { image, .. } => image.band_names(),
        }
    }

    /// The scene collection at the root of the expression, if any
    pub fn collection(&self) -> Option<&SceneCollection> {
        match self {
            Image::Mean(collection) => Some(collection),
            Image::Mask(_) => None,
            Image::Divide(inner, _) | Image::Clip(inner, _) | Image::GreaterThan(inner, _) => {
                inner.collection()
            }
            Image::UpdateMask { image, .. } => image.collection(),
        }
    }

    /// Compute the expression.
    pub fn evaluate<P: PixelSource + ?Sized>(&self, source: &P) -> Result<Bands> {
        match self {
            Image::Mean(collection) => collection
                .bands
                .iter()
                .map(|band| {
                    let rasters = collection
                        .scenes
                        .iter()
                        .map(|scene| source.scene_band(scene, band))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Band::new(band, mean_of(&rasters)?))
                })
                .collect::<Result<Vec<_>>>()
                .map(Bands),
            Image::Divide(inner, divisor) => {
                let divisor = *divisor;
                Ok(inner.evaluate(source)?.map(|r| r.map(|v| v / divisor)))
            }
            Image::Clip(inner, aoi) => Ok(inner.evaluate(source)?.map(|r| {
                r.retain_where(|lon, lat| aoi.contains(LonLat::new(lon, lat)))
            })),
            Image::Mask(mask) => {
                let raster = source.intensities(mask)?;
                Ok(Bands(vec![Band::new(MASK_BAND, (*raster).clone())]))
            }
            Image::GreaterThan(inner, threshold) => {
                let threshold = *threshold;
                Ok(inner
                    .evaluate(source)?
                    .map(|r| r.map(|v| if v > threshold { 1.0 } else { 0.0 })))
            }
            Image::UpdateMask { image, mask } => {
                let values = image.evaluate(source)?;
                let mask = mask.evaluate(source)?;
                apply_mask(values, &mask)
            }
        }
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Image::Mean(c) => write!(f, "mean({} scenes, [{}])", c.len(), c.bands.join(", ")),
            Image::Divide(inner, d) => write!(f, "{inner}.divide({d})"),
            Image::Clip(inner, _) => write!(f, "{inner}.clip(aoi)"),
            Image::Mask(m) => write!(f, "mask({m})"),
            Image::GreaterThan(inner, t) => write!(f, "{inner}.gt({t})"),
            Image::UpdateMask { image, mask } => write!(f, "{image}.updateMask({mask})"),
        }
    }
}

fn mean_of(rasters: &[Arc<Raster>]) -> Result<Raster> {
    let Some(first) = rasters.first() else {
        return Ok(Raster::empty());
    };

    let mut sum = Raster::filled(first.rows(), first.cols(), 0.0).with_transform(*first.transform());
    let mut count = sum.clone();
    for raster in rasters {
        sum = sum.zip_map(raster, |s, v| if v.is_nan() { s } else { s + v })?;
        count = count.zip_map(raster, |c, v| if v.is_nan() { c } else { c + 1.0 })?;
    }
    sum.zip_map(&count, |s, c| if c == 0.0 { f64::NAN } else { s / c })
}

fn apply_mask(values: Bands, mask: &Bands) -> Result<Bands> {
    let masks = &mask.0;
    if masks.len() != 1 && masks.len() != values.0.len() {
        return Err(Error::Other(format!(
            "cannot mask {} bands with {} mask bands",
            values.0.len(),
            masks.len()
        )));
    }

    values
        .0
        .into_iter()
        .enumerate()
        .map(|(i, band)| {
            let m = if masks.len() == 1 { &masks[0] } else { &masks[i] };
            let raster = band.raster.zip_map(&m.raster, |v, keep| {
                if keep.is_nan() || keep == 0.0 { f64::NAN } else { v }
            })?;
            Ok(Band::new(&band.name, raster))
        })
        .collect::<Result<Vec<_>>>()
        .map(Bands)
}

/// A named single-band raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: String,
    pub raster: Raster,
}

impl Band {
    pub fn new(name: impl Into<String>, raster: Raster) -> Self {
        Self {
            name: name.into(),
            raster,
        }
    }
}

/// Result of evaluating an [`Image`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bands(pub Vec<Band>);

impl Bands {
    pub fn get(&self, name: &str) -> Option<&Raster> {
        self.0.iter().find(|b| b.name == name).map(|b| &b.raster)
    }

    pub fn first(&self) -> Option<&Raster> {
        self.0.first().map(|b| &b.raster)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn map<F: Fn(&Raster) -> Raster>(self, f: F) -> Bands {
        Bands(
            self.0
                .into_iter()
                .map(|b| Band {
                    raster: f(&b.raster),
                    name: b.name,
                })
                .collect(),
        )
    }
}

/// Everything an [`Image`] may read: masks and scene bands.
///
/// Sources without access to scene pixels keep the default, which reports
/// the band as unavailable.
pub trait PixelSource: MaskSource {
    fn scene_band(&self, scene: &Scene, band: &str) -> Result<Arc<Raster>> {
        Err(Error::BandUnavailable {
            scene: scene.id.clone(),
            band: band.to_string(),
        })
    }
}

impl PixelSource for GeoTiffMaskStore {}
impl PixelSource for MemoryMaskStore {}

impl<P: PixelSource + ?Sized> PixelSource for Arc<P> {
    fn scene_band(&self, scene: &Scene, band: &str) -> Result<Arc<Raster>> {
        (**self).scene_band(scene, band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use crate::geometry::BBox;
    use crate::raster::GeoTransform;
    use geo_types::Polygon;
    use std::collections::{BTreeMap, HashMap};

    /// Masks from memory plus per-scene band rasters.
    #[derive(Default)]
    struct Fixture {
        masks: MemoryMaskStore,
        bands: HashMap<(String, String), Arc<Raster>>,
    }

    impl Fixture {
        fn band(mut self, scene: &str, band: &str, raster: Raster) -> Self {
            self.bands
                .insert((scene.to_string(), band.to_string()), Arc::new(raster));
            self
        }
    }

    impl MaskSource for Fixture {
        fn geometry(&self, mask: &MaskRef) -> Result<Polygon<f64>> {
            self.masks.geometry(mask)
        }

        fn intensities(&self, mask: &MaskRef) -> Result<Arc<Raster>> {
            self.masks.intensities(mask)
        }
    }

    impl PixelSource for Fixture {
        fn scene_band(&self, scene: &Scene, band: &str) -> Result<Arc<Raster>> {
            self.bands
                .get(&(scene.id.clone(), band.to_string()))
                .cloned()
                .ok_or_else(|| Error::BandUnavailable {
                    scene: scene.id.clone(),
                    band: band.to_string(),
                })
        }
    }

    fn scene(id: &str) -> Scene {
        Scene {
            id: id.to_string(),
            acquired: parse_date("2019-04-24").unwrap(),
            bbox: None,
            assets: BTreeMap::new(),
        }
    }

    fn grid(values: Vec<f64>) -> Raster {
        Raster::from_vec(values, 2, 2)
            .unwrap()
            .with_transform(GeoTransform::new(0.0, 2.0, 1.0, -1.0))
    }

    #[test]
    fn mean_ignores_nodata_per_pixel() {
        let source = Fixture::default()
            .band("a", "B04", grid(vec![1000.0, f64::NAN, 3000.0, f64::NAN]))
            .band("b", "B04", grid(vec![3000.0, 2000.0, 1000.0, f64::NAN]));
        let collection = SceneCollection::new(vec!["B04".into()], vec![scene("a"), scene("b")]);

        let out = collection.mean().divide(10000.0).evaluate(&source).unwrap();
        let red = out.get("B04").unwrap();
        assert!((red.get(0, 0).unwrap() - 0.2).abs() < 1e-12);
        assert!((red.get(0, 1).unwrap() - 0.2).abs() < 1e-12);
        assert!((red.get(1, 0).unwrap() - 0.2).abs() < 1e-12);
        assert!(red.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn mean_of_no_scenes_is_empty_not_an_error() {
        let collection = SceneCollection::empty(vec!["B04".into(), "B03".into(), "B02".into()]);
        let aoi = Aoi::from_bbox(BBox::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        let out = collection
            .mean()
            .divide(10000.0)
            .clip(aoi)
            .evaluate(&MemoryMaskStore::new())
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.0.iter().all(|b| b.raster.is_empty()));
    }

    #[test]
    fn clip_masks_pixels_outside_the_aoi() {
        let source = Fixture::default().band("a", "B02", grid(vec![1.0, 2.0, 3.0, 4.0]));
        let collection = SceneCollection::new(vec!["B02".into()], vec![scene("a")]);
        // Covers only the left column (pixel centres at lon 0.5).
        let aoi = Aoi::from_bbox(BBox::new(0.0, 0.0, 1.0, 2.0)).unwrap();

        let out = collection.mean().clip(aoi).evaluate(&source).unwrap();
        let blue = out.first().unwrap();
        assert_eq!(blue.get(0, 0).unwrap(), 1.0);
        assert!(blue.get(0, 1).unwrap().is_nan());
        assert_eq!(blue.get(1, 0).unwrap(), 3.0);
        assert!(blue.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn thresholded_mask_keeps_only_strong_detections() {
        let masks = MemoryMaskStore::new().with("m", grid(vec![100.0, 101.0, f64::NAN, 237.0]));
        let id = MaskRef::new("m");
        let layer = Image::mask(id.clone()).update_mask(Image::mask(id).gt(100.0));

        let out = layer.evaluate(&masks).unwrap();
        let litter = out.get(MASK_BAND).unwrap();
        assert!(litter.get(0, 0).unwrap().is_nan());
        assert_eq!(litter.get(0, 1).unwrap(), 101.0);
        assert!(litter.get(1, 0).unwrap().is_nan());
        assert_eq!(litter.get(1, 1).unwrap(), 237.0);
    }

    #[test]
    fn scene_pixels_are_unavailable_by_default() {
        let collection = SceneCollection::new(vec!["B04".into()], vec![scene("S2A_1")]);
        let err = collection.mean().evaluate(&MemoryMaskStore::new()).unwrap_err();
        assert!(matches!(err, Error::BandUnavailable { ref scene, .. } if scene == "S2A_1"));
    }

    #[test]
    fn identical_inputs_give_equal_expressions() {
        let make = || Image::mask(MaskRef::new("durban190425")).gt(100.0);
        assert_eq!(make(), make());
        assert_eq!(make().to_string(), "mask(durban190425).gt(100)");
    }
}
