//! Layer composition for one region/date selection.
//!
//! For a [`RenderRequest`] the compositor:
//!
//! 1. derives the AOI from the mask footprint,
//! 2. asks the imagery service for scenes in the request's window,
//! 3. builds the true-colour layer (`mean / 10000`, clipped to the AOI) and
//!    the thresholded litter layer on top of it,
//! 4. picks the viewport from the region's anchor.
//!
//! The imagery query is the only suspend point. A request cancelled before
//! or during the query yields no composition, so a superseded render never
//! touches the map.

use std::fmt;

use litterscope_core::{
    Anchor, Aoi, DateWindow, Image, ImageryService, MaskRef, MaskSource, Result, SceneCollection,
    SceneQuery,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::controller::RenderRequest;
use crate::layer::{Layer, VisParams};
use crate::surface::{CenterTarget, MapSurface, Viewport};

/// Tunables for composition. Defaults reproduce the litter map.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorOptions {
    /// Imagery collection to query
    pub collection: String,
    /// Visible bands, in red, green, blue order
    pub rgb_bands: Vec<String>,
    /// Divisor turning reflectance integers into [0, 1]
    pub reflectance_scale: f64,
    pub rgb_min: f64,
    pub rgb_max: f64,
    /// Mask intensities at or below this are hidden
    pub litter_threshold: f64,
    pub litter_min: f64,
    pub litter_max: f64,
    pub litter_palette: Vec<String>,
    /// Zoom when centring on the mask footprint
    pub derived_zoom: u8,
    /// Zoom when centring on a configured anchor point
    pub anchor_zoom: u8,
    pub rgb_label: String,
    pub litter_label: String,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            collection: "sentinel-2-l2a".to_string(),
            rgb_bands: vec!["B04".into(), "B03".into(), "B02".into()],
            reflectance_scale: 10000.0,
            rgb_min: 0.0,
            rgb_max: 0.4,
            litter_threshold: 100.0,
            litter_min: 0.0,
            litter_max: 237.0,
            litter_palette: vec!["green".into(), "red".into()],
            derived_zoom: 12,
            anchor_zoom: 14,
            rgb_label: "Sentinel-2-Image".to_string(),
            litter_label: "Marine Litter".to_string(),
        }
    }
}

/// What the imagery service returned for a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageryStatus {
    Available { scenes: usize },
    NoScenes,
    /// The service failed; the composite is empty
    Unavailable { reason: String },
}

impl ImageryStatus {
    /// Text shown over the map when the composite is empty.
    pub fn notice(&self) -> Option<String> {
        match self {
            ImageryStatus::Available { .. } => None,
            ImageryStatus::NoScenes => {
                Some("No imagery available for the selected date".to_string())
            }
            ImageryStatus::Unavailable { reason } => {
                Some(format!("No imagery available: {reason}"))
            }
        }
    }
}

/// Layers and viewport for one request, ready to be applied to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub generation: u64,
    pub mask: MaskRef,
    pub window: DateWindow,
    pub aoi: Aoi,
    /// Bottom to top
    pub layers: Vec<Layer>,
    pub target: CenterTarget,
    pub zoom: u8,
    pub imagery: ImageryStatus,
}

impl Composition {
    /// Replace everything on `surface` with this composition.
    pub fn apply<S: MapSurface + ?Sized>(&self, surface: &mut S) {
        surface.reset_layers();
        for layer in &self.layers {
            surface.add_layer(layer.clone());
        }
        surface.center_object(&self.target, self.zoom);
        surface.show_notice(self.imagery.notice());
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            center: self.target.center(),
            zoom: self.zoom,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(Composition),
    /// A newer request was issued before this one finished
    Superseded { generation: u64 },
}

/// Builds layers from masks and imagery.
pub struct Compositor<I, M> {
    imagery: I,
    masks: M,
    options: CompositorOptions,
}

impl<I: ImageryService, M: MaskSource> Compositor<I, M> {
    pub fn new(imagery: I, masks: M, options: CompositorOptions) -> Self {
        Self {
            imagery,
            masks,
            options,
        }
    }

    pub fn options(&self) -> &CompositorOptions {
        &self.options
    }

    pub fn masks(&self) -> &M {
        &self.masks
    }

    pub fn imagery(&self) -> &I {
        &self.imagery
    }

    /// Build the composition for `request`, or `None` if the request was
    /// cancelled first.
    ///
    /// Missing or degenerate masks are errors; imagery failures are not.
    pub async fn prepare(&self, request: &RenderRequest) -> Result<Option<Composition>> {
        if request.is_cancelled() {
            return Ok(None);
        }

        let footprint = self.masks.geometry(&request.mask)?;
        let aoi = Aoi::from_footprint(&footprint)?;
        let query = SceneQuery {
            collection: self.options.collection.clone(),
            aoi: aoi.clone(),
            window: request.window,
            bands: self.options.rgb_bands.clone(),
        };

        let found = tokio::select! {
            biased;
            _ = request.cancel.cancelled() => return Ok(None),
            found = self.imagery.search(&query) => found,
        };
        if request.is_cancelled() {
            return Ok(None);
        }

        let (scenes, imagery) = match found {
            Ok(c) if c.is_empty() => (c, ImageryStatus::NoScenes),
            Ok(c) => {
                let n = c.len();
                (c, ImageryStatus::Available { scenes: n })
            }
            Err(e) => {
                warn!(error = %e, mask = %request.mask, "imagery unavailable");
                (
                    SceneCollection::empty(query.bands.clone()),
                    ImageryStatus::Unavailable {
                        reason: e.to_string(),
                    },
                )
            }
        };
        debug!(?imagery, window = %request.window, "imagery resolved");

        let (target, zoom) = match request.anchor {
            Anchor::Point(p) => (CenterTarget::Point(p), self.options.anchor_zoom),
            Anchor::DeriveFromMask => (CenterTarget::Geometry(aoi.clone()), self.options.derived_zoom),
        };

        Ok(Some(Composition {
            generation: request.generation,
            mask: request.mask.clone(),
            window: request.window,
            layers: vec![
                self.rgb_layer(scenes, &aoi),
                self.litter_layer(&request.mask),
            ],
            aoi,
            target,
            zoom,
            imagery,
        }))
    }

    /// Prepare and, unless superseded, apply to `surface`.
    ///
    /// If preparing fails for a live request the surface is cleared and
    /// shows the failure, so it never keeps layers of an older selection.
    pub async fn render<S: MapSurface + ?Sized>(
        &self,
        request: &RenderRequest,
        surface: &mut S,
    ) -> Result<RenderOutcome> {
        let prepared = match self.prepare(request).await {
            Ok(prepared) => prepared,
            Err(e) => {
                if !request.is_cancelled() {
                    self.show_failure(request, &e, surface);
                }
                return Err(e);
            }
        };
        match prepared {
            Some(composition) => {
                composition.apply(surface);
                info!(
                    region = %request.region,
                    date = %request.date,
                    generation = request.generation,
                    "rendered"
                );
                Ok(RenderOutcome::Rendered(composition))
            }
            None => {
                debug!(generation = request.generation, "render superseded");
                Ok(RenderOutcome::Superseded {
                    generation: request.generation,
                })
            }
        }
    }

    /// Remove all layers and show why `request` could not be drawn. A point
    /// anchor is still centred on.
    pub fn show_failure<S: MapSurface + ?Sized>(
        &self,
        request: &RenderRequest,
        reason: impl fmt::Display,
        surface: &mut S,
    ) {
        let reason = reason.to_string();
        warn!(
            region = %request.region,
            date = %request.date,
            generation = request.generation,
            %reason,
            "render failed"
        );
        surface.reset_layers();
        if let Anchor::Point(p) = request.anchor {
            surface.center_object(&CenterTarget::Point(p), self.options.anchor_zoom);
        }
        surface.show_notice(Some(format!(
            "No layers for {} on {}: {reason}",
            request.region, request.date
        )));
    }

    fn rgb_layer(&self, scenes: SceneCollection, aoi: &Aoi) -> Layer {
        let o = &self.options;
        Layer::new(
            o.rgb_label.clone(),
            scenes.mean().divide(o.reflectance_scale).clip(aoi.clone()),
            VisParams::rgb(o.rgb_bands.clone(), o.rgb_min, o.rgb_max),
        )
    }

    fn litter_layer(&self, mask: &MaskRef) -> Layer {
        let o = &self.options;
        let strong = Image::mask(mask.clone()).gt(o.litter_threshold);
        Layer::new(
            o.litter_label.clone(),
            Image::mask(mask.clone()).update_mask(strong),
            VisParams::palette(o.litter_palette.clone(), o.litter_min, o.litter_max),
        )
    }
}
