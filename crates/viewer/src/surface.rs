//! The display surface the compositor draws on.

use litterscope_core::{Aoi, LonLat};
use serde::{Deserialize, Serialize};

use crate::layer::Layer;

/// What the viewport is centred on.
#[derive(Debug, Clone, PartialEq)]
pub enum CenterTarget {
    Point(LonLat),
    /// A footprint; the viewport goes to its centroid
    Geometry(Aoi),
}

impl CenterTarget {
    pub fn center(&self) -> LonLat {
        match self {
            CenterTarget::Point(p) => *p,
            CenterTarget::Geometry(aoi) => aoi.center(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LonLat,
    pub zoom: u8,
}

/// Operations a map widget offers the compositor.
///
/// Layers are drawn in insertion order, later layers on top.
pub trait MapSurface {
    /// Remove every layer.
    fn reset_layers(&mut self);

    fn add_layer(&mut self, layer: Layer);

    fn center_object(&mut self, target: &CenterTarget, zoom: u8);

    /// Show a message over the map, or clear it with `None`.
    fn show_notice(&mut self, notice: Option<String>);
}

impl<S: MapSurface + ?Sized> MapSurface for &mut S {
    fn reset_layers(&mut self) {
        (**self).reset_layers()
    }

    fn add_layer(&mut self, layer: Layer) {
        (**self).add_layer(layer)
    }

    fn center_object(&mut self, target: &CenterTarget, zoom: u8) {
        (**self).center_object(target, zoom)
    }

    fn show_notice(&mut self, notice: Option<String>) {
        (**self).show_notice(notice)
    }
}

/// In-memory map surface: the state a widget would display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    layers: Vec<Layer>,
    target: Option<CenterTarget>,
    viewport: Option<Viewport>,
    notice: Option<String>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, label: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.label == label)
    }

    /// Toggle a layer's visibility; returns false for an unknown label.
    pub fn set_shown(&mut self, label: &str, shown: bool) -> bool {
        match self.layers.iter_mut().find(|l| l.label == label) {
            Some(layer) => {
                layer.shown = shown;
                true
            }
            None => false,
        }
    }

    pub fn target(&self) -> Option<&CenterTarget> {
        self.target.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

impl MapSurface for MapState {
    fn reset_layers(&mut self) {
        self.layers.clear();
    }

    fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    fn center_object(&mut self, target: &CenterTarget, zoom: u8) {
        self.viewport = Some(Viewport {
            center: target.center(),
            zoom,
        });
        self.target = Some(target.clone());
    }

    fn show_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }
}
