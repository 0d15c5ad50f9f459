//! Map view: AOI footprint, litter overlay, anchor and notice banner,
//! drawn in Web Mercator around the current viewport.

use std::f64::consts::PI;

use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, TextureHandle, Vec2};
use litterscope_core::{Aoi, LonLat};
use litterscope_viewer::{MapState, Viewport};

use crate::state::MaskOverlay;

const TILE_SIZE: f64 = 256.0;

/// Pan and extra zoom on top of the viewport the compositor picked.
pub struct MapViewState {
    /// Pan offset in screen pixels.
    pub pan: Vec2,
    /// Scale factor relative to the viewport zoom (1.0 = as composed).
    pub scale: f32,
}

impl Default for MapViewState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl MapViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What to draw besides the map state itself.
pub struct MapLayers<'a> {
    pub aoi: Option<&'a Aoi>,
    pub overlay: Option<&'a MaskOverlay>,
    /// Label of the layer the overlay belongs to
    pub overlay_label: &'a str,
}

/// Web Mercator world pixel coordinates at a (fractional) zoom level.
fn world_px(p: LonLat, zoom: f64) -> (f64, f64) {
    let size = TILE_SIZE * 2f64.powf(zoom);
    let lat = p.lat.to_radians();
    let x = (p.lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Screen offset of `p` from the viewport centre.
pub fn project(p: LonLat, viewport: &Viewport, scale: f32) -> Vec2 {
    let zoom = f64::from(viewport.zoom) + f64::from(scale).log2();
    let (px, py) = world_px(p, zoom);
    let (cx, cy) = world_px(viewport.center, zoom);
    Vec2::new((px - cx) as f32, (py - cy) as f32)
}

/// Render the map into the given UI area.
pub fn show_map_view(
    ui: &mut egui::Ui,
    map: &MapState,
    layers: MapLayers<'_>,
    texture: &mut Option<TextureHandle>,
    state: &mut MapViewState,
    ctx: &egui::Context,
) {
    let available = ui.available_size();
    let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
    let rect = response.rect;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(18, 34, 52));

    let Some(viewport) = map.viewport() else {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Select a region to start",
            egui::FontId::proportional(14.0),
            Color32::LIGHT_GRAY,
        );
        return;
    };

    // Zoom (mouse wheel) and pan (drag)
    let scroll = ui.input(|i| i.raw_scroll_delta.y);
    if scroll != 0.0 && response.hovered() {
        let factor = if scroll > 0.0 { 1.1 } else { 1.0 / 1.1 };
        let new_scale = (state.scale * factor).clamp(0.05, 20.0);
        state.pan *= new_scale / state.scale;
        state.scale = new_scale;
    }
    if response.dragged() {
        state.pan += response.drag_delta();
    }

    let origin = rect.center() + state.pan;
    let to_screen = |p: LonLat| origin + project(p, &viewport, state.scale);

    // Composite footprint
    if let Some(aoi) = layers.aoi {
        let base_shown = map.layers().first().is_some_and(|l| l.shown);
        let points: Vec<Pos2> = aoi
            .polygon()
            .exterior()
            .coords()
            .map(|c| to_screen(LonLat::new(c.x, c.y)))
            .collect();
        let fill = if base_shown {
            Color32::from_rgba_unmultiplied(90, 110, 130, 90)
        } else {
            Color32::TRANSPARENT
        };
        painter.add(Shape::convex_polygon(
            points,
            fill,
            Stroke::new(1.5, Color32::from_rgb(200, 220, 240)),
        ));
    }

    // Litter overlay
    let overlay_shown = map
        .layer(layers.overlay_label)
        .is_some_and(|l| l.shown);
    if let (Some(overlay), true) = (layers.overlay, overlay_shown) {
        ensure_texture(overlay, texture, ctx);
        if let Some(tex) = texture.as_ref() {
            let b = overlay.bounds;
            let img_rect = Rect::from_two_pos(
                to_screen(LonLat::new(b.west, b.north)),
                to_screen(LonLat::new(b.east, b.south)),
            );
            painter.image(
                tex.id(),
                img_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }

    // Anchor crosshair
    let c = to_screen(viewport.center);
    let stroke = Stroke::new(1.0, Color32::from_rgb(255, 220, 120));
    painter.line_segment([c - Vec2::X * 8.0, c + Vec2::X * 8.0], stroke);
    painter.line_segment([c - Vec2::Y * 8.0, c + Vec2::Y * 8.0], stroke);

    if let Some(notice) = map.notice() {
        let banner = Rect::from_min_size(rect.left_top(), Vec2::new(rect.width(), 24.0));
        painter.rect_filled(banner, 0.0, Color32::from_rgba_unmultiplied(120, 60, 0, 200));
        painter.text(
            banner.center(),
            egui::Align2::CENTER_CENTER,
            notice,
            egui::FontId::proportional(13.0),
            Color32::WHITE,
        );
    }

    // Status bar
    let status_rect = Rect::from_min_size(
        Pos2::new(rect.left(), rect.bottom() - 20.0),
        Vec2::new(rect.width(), 20.0),
    );
    painter.rect_filled(status_rect, 0.0, Color32::from_gray(40));
    let zoom = f64::from(viewport.zoom) + f64::from(state.scale).log2();
    painter.text(
        status_rect.center(),
        egui::Align2::CENTER_CENTER,
        format!("Centre: {}  |  Zoom: {:.1}", viewport.center, zoom),
        egui::FontId::monospace(11.0),
        Color32::LIGHT_GRAY,
    );
}

fn ensure_texture(overlay: &MaskOverlay, texture: &mut Option<TextureHandle>, ctx: &egui::Context) {
    if texture.is_none() {
        let image =
            egui::ColorImage::from_rgba_unmultiplied([overlay.width, overlay.height], &overlay.rgba);
        *texture = Some(ctx.load_texture("litter-overlay", image, egui::TextureOptions::NEAREST));
    }
}
