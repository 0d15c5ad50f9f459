//! End-to-end selection → composition → map tests.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use common::{RecordingImagery, catalog, date, masks};
use litterscope_core::{Error, Image, MaskRef, RegionCatalog};
use litterscope_viewer::{
    CenterTarget, Compositor, CompositorOptions, ImageryStatus, MapState, Notification,
    RenderOutcome, SelectionController, Viewer, ViewerEvent,
};

type TestViewer = Viewer<RecordingImagery, litterscope_core::MemoryMaskStore, MapState>;

fn viewer_with(imagery: RecordingImagery) -> TestViewer {
    Viewer::new(
        catalog(),
        Compositor::new(imagery, masks(), CompositorOptions::default()),
        MapState::new(),
    )
}

#[tokio::test]
async fn durban_start_queries_adjacent_days_and_centres_on_anchor() {
    let mut viewer = viewer_with(RecordingImagery::with_scenes(2));
    let update = viewer.start().await.unwrap();

    let queries = viewer.compositor().imagery().queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].window.start, date("2019-04-23"));
    assert_eq!(queries[0].window.end, date("2019-04-25"));
    assert_eq!(queries[0].collection, "sentinel-2-l2a");
    assert_eq!(queries[0].bands, ["B04", "B03", "B02"]);

    let map = viewer.surface();
    let viewport = map.viewport().unwrap();
    assert_relative_eq!(viewport.center.lon, 31.078424502408225);
    assert_relative_eq!(viewport.center.lat, -29.855263513511353);
    assert_eq!(viewport.zoom, 14);
    assert_eq!(map.notice(), None);

    let labels: Vec<_> = map.layers().iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, ["Sentinel-2-Image", "Marine Litter"]);
    let rgb = &map.layers()[0];
    assert_eq!(rgb.vis.bands, ["B04", "B03", "B02"]);
    assert_eq!((rgb.vis.min, rgb.vis.max), (0.0, 0.4));
    let litter = &map.layers()[1];
    assert_eq!(litter.vis.palette, ["green", "red"]);
    assert_eq!((litter.vis.min, litter.vis.max), (0.0, 237.0));

    assert!(matches!(
        update.outcome,
        RenderOutcome::Rendered(ref c) if c.imagery == ImageryStatus::Available { scenes: 2 }
    ));
    assert_eq!(update.notifications.len(), 2);
}

#[tokio::test]
async fn switching_region_replaces_layers_and_dates() {
    let mut viewer = viewer_with(RecordingImagery::with_scenes(1));
    viewer.start().await.unwrap();

    let update = viewer
        .handle(ViewerEvent::RegionSelected("Baltic sea".into()))
        .await
        .unwrap();

    assert!(matches!(
        &update.notifications[0],
        Notification::RegionChanged { region, .. } if region == "Baltic sea"
    ));
    assert_eq!(viewer.controller().date_options().len(), 5);
    assert_eq!(viewer.controller().selection().date, Some(date("2019-06-10")));

    let map = viewer.surface();
    assert_eq!(map.layers().len(), 2);
    let expected_mask = Image::mask(MaskRef::new("baltic190610"));
    assert_eq!(
        map.layers()[1].image,
        expected_mask.clone().update_mask(expected_mask.gt(100.0))
    );
    let viewport = map.viewport().unwrap();
    assert_eq!(viewport.center.lon, 11.835695130768501);
    assert_eq!(viewport.zoom, 14);

    let last = viewer.compositor().imagery().queries().pop().unwrap();
    assert_eq!(last.window.start, date("2019-06-09"));
    assert_eq!(last.window.end, date("2019-06-11"));
}

#[tokio::test]
async fn date_outside_region_is_rejected_without_touching_the_map() {
    let mut viewer = viewer_with(RecordingImagery::with_scenes(1));
    viewer.start().await.unwrap();
    let before = viewer.surface().clone();
    let selection = viewer.controller().selection().clone();

    let err = viewer
        .handle(ViewerEvent::DateSelected(date("2019-06-10")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DateNotInRegion { .. }));
    assert_eq!(viewer.surface(), &before);
    assert_eq!(viewer.controller().selection(), &selection);
    assert_eq!(viewer.compositor().imagery().queries().len(), 1);
}

#[tokio::test]
async fn unknown_region_is_rejected() {
    let mut viewer = viewer_with(RecordingImagery::default());
    viewer.start().await.unwrap();
    let before = viewer.surface().clone();

    let err = viewer
        .handle(ViewerEvent::RegionSelected("Atlantis".into()))
        .await
        .unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(viewer.surface(), &before);
}

#[tokio::test]
async fn identical_requests_give_identical_maps() {
    let compositor = Compositor::new(
        RecordingImagery::with_scenes(3),
        masks(),
        CompositorOptions::default(),
    );
    let mut controller = SelectionController::new(catalog());
    let request = controller.initialize().unwrap().render;

    let mut a = MapState::new();
    let mut b = MapState::new();
    let first = compositor.render(&request, &mut a).await.unwrap();
    let second = compositor.render(&request, &mut b).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(a, b);

    // Rendering again onto a used map replaces rather than appends.
    compositor.render(&request, &mut a).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn derived_anchor_centres_on_mask_footprint_at_zoom_12() {
    let json = r#"{
        "Durban": {
            "dates": ["2019-04-19", "2019-04-24", "2019-04-29"],
            "masks": ["durban190419", "durban190425", "durban190429"],
            "default_date": "2019-04-24",
            "anchor": null
        }
    }"#;
    let catalog = Arc::new(RegionCatalog::from_json(json).unwrap());
    let mut viewer = Viewer::new(
        catalog,
        Compositor::new(RecordingImagery::with_scenes(1), masks(), CompositorOptions::default()),
        MapState::new(),
    );
    viewer.start().await.unwrap();

    let map = viewer.surface();
    let viewport = map.viewport().unwrap();
    assert_eq!(viewport.zoom, 12);
    assert_relative_eq!(viewport.center.lon, 31.08, epsilon = 1e-9);
    assert_relative_eq!(viewport.center.lat, -29.85, epsilon = 1e-9);
    assert!(matches!(map.target(), Some(CenterTarget::Geometry(_))));
}

#[tokio::test]
async fn no_scenes_gives_an_empty_composite_and_a_notice() {
    let mut viewer = viewer_with(RecordingImagery::with_scenes(0));
    let update = viewer.start().await.unwrap();

    let RenderOutcome::Rendered(composition) = update.outcome else {
        panic!("expected a render");
    };
    assert_eq!(composition.imagery, ImageryStatus::NoScenes);
    assert!(viewer.surface().notice().is_some());

    let rgb = viewer.surface().layer("Sentinel-2-Image").unwrap();
    let bands = rgb.image.evaluate(viewer.compositor().masks()).unwrap();
    assert_eq!(bands.len(), 3);
    assert!(bands.0.iter().all(|b| b.raster.is_empty()));
}

#[tokio::test]
async fn imagery_failure_is_shown_not_raised() {
    let mut viewer = viewer_with(RecordingImagery::failing("HTTP 503"));
    let update = viewer.start().await.unwrap();

    let RenderOutcome::Rendered(composition) = update.outcome else {
        panic!("expected a render");
    };
    assert!(matches!(
        composition.imagery,
        ImageryStatus::Unavailable { ref reason } if reason.contains("HTTP 503")
    ));
    assert!(viewer.surface().notice().unwrap().contains("HTTP 503"));
    assert_eq!(viewer.surface().layers().len(), 2);
}

#[tokio::test]
async fn missing_mask_is_an_error_and_leaves_an_empty_map() {
    let mut viewer = Viewer::new(
        catalog(),
        Compositor::new(
            RecordingImagery::default(),
            litterscope_core::MemoryMaskStore::new(),
            CompositorOptions::default(),
        ),
        MapState::new(),
    );
    let err = viewer.start().await.unwrap_err();
    assert!(matches!(err, Error::MaskNotFound(ref id) if id == "durban190425"));
    assert!(viewer.surface().layers().is_empty());
    assert!(viewer.surface().notice().unwrap().contains("durban190425"));
    assert!(viewer.compositor().imagery().queries().is_empty());
}

#[tokio::test]
async fn switching_to_a_region_without_masks_drops_the_old_layers() {
    let durban_only = litterscope_core::MemoryMaskStore::new().with(
        "durban190425",
        common::mask_at(31.03, -29.80),
    );
    let mut viewer = Viewer::new(
        catalog(),
        Compositor::new(
            RecordingImagery::with_scenes(1),
            durban_only,
            CompositorOptions::default(),
        ),
        MapState::new(),
    );
    viewer.start().await.unwrap();
    assert_eq!(viewer.surface().layers().len(), 2);

    let err = viewer
        .handle(ViewerEvent::RegionSelected("Baltic sea".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MaskNotFound(ref id) if id == "baltic190610"));

    let selection = viewer.controller().selection();
    assert_eq!(selection.region.as_deref(), Some("Baltic sea"));
    assert_eq!(selection.date, Some(date("2019-06-10")));

    let map = viewer.surface();
    assert!(map.layers().is_empty());
    assert!(map.notice().unwrap().contains("baltic190610"));
    let viewport = map.viewport().unwrap();
    assert_eq!(viewport.center.lon, 11.835695130768501);
    assert_eq!(viewport.center.lat, 54.2792381124053);
    assert_eq!(viewport.zoom, 14);
}

#[tokio::test]
async fn litter_layer_keeps_only_pixels_above_threshold() {
    let mut viewer = viewer_with(RecordingImagery::with_scenes(1));
    viewer.start().await.unwrap();

    let litter = viewer.surface().layer("Marine Litter").unwrap();
    let bands = litter.image.evaluate(viewer.compositor().masks()).unwrap();
    let raster = bands.first().unwrap();
    for &v in raster.data().iter() {
        assert!(v.is_nan() || v > 100.0, "{v} should have been masked");
    }
    let stats = raster.statistics();
    assert_eq!(stats.max, Some(237.0));
    assert!(stats.nodata_count > 0);
}
