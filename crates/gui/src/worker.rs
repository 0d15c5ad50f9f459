//! Background rendering.
//!
//! Each render request runs on its own thread with a current-thread tokio
//! runtime. The result goes back to the UI over the app channel tagged with
//! the request's generation; the UI drops anything that is no longer current.

use std::future::Future;
use std::sync::Arc;

use crossbeam_channel::Sender;
use litterscope_cloud::{
    CloudError, StacCatalog, StacClientOptions, StacImagery, StacImageryOptions,
};
use litterscope_colormap::{ColormapParams, Palette, raster_to_rgba};
use litterscope_core::{
    BBox, GeoTiffMaskStore, ImageryService, OfflineImagery, PixelSource, Result, SceneCollection,
    SceneQuery,
};
use litterscope_viewer::{Composition, Compositor, RenderRequest};
use tracing::warn;

use crate::state::{AppMessage, MaskOverlay};

/// The imagery backends the app can run against.
pub enum Imagery {
    Stac(StacImagery),
    Offline(OfflineImagery),
}

impl Imagery {
    pub fn new(offline: bool, catalog: &str) -> std::result::Result<Self, CloudError> {
        if offline {
            return Ok(Imagery::Offline(OfflineImagery));
        }
        Ok(Imagery::Stac(StacImagery::new(
            StacCatalog::from_str_or_url(catalog),
            StacClientOptions::default(),
            StacImageryOptions::default(),
        )?))
    }
}

impl ImageryService for Imagery {
    fn search(
        &self,
        query: &SceneQuery,
    ) -> impl Future<Output = Result<SceneCollection>> + Send {
        async move {
            match self {
                Imagery::Stac(stac) => stac.search(query).await,
                Imagery::Offline(offline) => offline.search(query).await,
            }
        }
    }
}

pub type AppCompositor = Compositor<Imagery, GeoTiffMaskStore>;

/// Prepare `request` on a new thread and post the result to `tx`.
pub fn spawn_render(
    compositor: Arc<AppCompositor>,
    request: RenderRequest,
    tx: Sender<AppMessage>,
    ctx: egui::Context,
) {
    std::thread::spawn(move || {
        let message = run(&compositor, &request);
        let _ = tx.send(message);
        ctx.request_repaint();
    });
}

fn run<M: PixelSource>(compositor: &Compositor<Imagery, M>, request: &RenderRequest) -> AppMessage {
    let generation = request.generation;
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            return AppMessage::RenderFailed {
                generation,
                message: format!("Failed to start async runtime: {e}"),
            };
        }
    };

    match runtime.block_on(compositor.prepare(request)) {
        Ok(Some(composition)) => {
            let overlay = render_overlay(
                compositor.masks(),
                &composition,
                &compositor.options().litter_label,
            );
            AppMessage::RenderReady {
                composition: Box::new(composition),
                overlay,
            }
        }
        Ok(None) => AppMessage::Superseded { generation },
        Err(e) => AppMessage::RenderFailed {
            generation,
            message: e.to_string(),
        },
    }
}

/// Evaluate the layer labelled `label` and color it with its own palette.
pub fn render_overlay<P: PixelSource + ?Sized>(
    source: &P,
    composition: &Composition,
    label: &str,
) -> Option<MaskOverlay> {
    let layer = composition.layers.iter().find(|l| l.label == label)?;
    let bands = match layer.image.evaluate(source) {
        Ok(bands) => bands,
        Err(e) => {
            warn!(error = %e, layer = label, "overlay not rendered");
            return None;
        }
    };
    let raster = bands.first()?;
    if raster.is_empty() {
        return None;
    }
    let palette = match Palette::from_names(&layer.vis.palette) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, layer = label, "bad palette");
            return None;
        }
    };
    let params = ColormapParams::new(palette, layer.vis.min, layer.vis.max);

    Some(MaskOverlay {
        width: raster.cols(),
        height: raster.rows(),
        rgba: raster_to_rgba(raster, &params),
        bounds: BBox::from_bounds(raster.bounds()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use litterscope_core::{GeoTransform, MemoryMaskStore, Raster, RegionCatalog};
    use litterscope_viewer::{CompositorOptions, SelectionController};

    fn mask() -> Raster {
        let values = (0..4 * 4).map(|i| ((i % 4) * 79) as f64).collect();
        Raster::from_vec(values, 4, 4)
            .unwrap()
            .with_transform(GeoTransform::new(31.03, -29.80, 0.01, -0.01))
    }

    fn request() -> RenderRequest {
        let catalog = Arc::new(RegionCatalog::builtin().unwrap());
        SelectionController::new(catalog)
            .initialize()
            .unwrap()
            .render
    }

    #[test]
    fn offline_render_colors_only_strong_pixels() {
        let compositor = Compositor::new(
            Imagery::Offline(OfflineImagery),
            MemoryMaskStore::new().with("durban190425", mask()),
            CompositorOptions::default(),
        );

        let AppMessage::RenderReady {
            composition,
            overlay,
        } = run(&compositor, &request())
        else {
            panic!("expected a render");
        };
        assert_eq!(composition.generation, 1);

        let overlay = overlay.unwrap();
        assert_eq!((overlay.width, overlay.height), (4, 4));
        assert_eq!(overlay.rgba.len(), 4 * 4 * 4);
        // Columns hold 0, 79, 158, 237; only the last two pass the threshold.
        assert_eq!(overlay.rgba[3], 0);
        assert_eq!(overlay.rgba[7], 0);
        assert_eq!(overlay.rgba[11], 255);
        assert_eq!(&overlay.rgba[12..16], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_mask_fails_the_render() {
        let compositor = Compositor::new(
            Imagery::Offline(OfflineImagery),
            MemoryMaskStore::new(),
            CompositorOptions::default(),
        );
        match run(&compositor, &request()) {
            AppMessage::RenderFailed {
                generation,
                message,
            } => {
                assert_eq!(generation, 1);
                assert!(message.contains("durban190425"));
            }
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn cancelled_request_is_superseded() {
        let compositor = Compositor::new(
            Imagery::Offline(OfflineImagery),
            MemoryMaskStore::new().with("durban190425", mask()),
            CompositorOptions::default(),
        );
        let request = request();
        request.cancel.cancel();
        assert!(matches!(
            run(&compositor, &request),
            AppMessage::Superseded { generation: 1 }
        ));
    }
}
