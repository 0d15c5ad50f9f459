//! Layer stack panel: visibility toggles, top layer first.

use egui::{RichText, Ui};
use litterscope_viewer::MapState;

/// Actions returned from the layers panel.
pub enum LayerAction {
    /// Show or hide the layer with this label.
    SetShown(String, bool),
    None,
}

/// Show the layer stack panel.
pub fn show_layers(ui: &mut Ui, map: &MapState) -> LayerAction {
    let mut action = LayerAction::None;

    ui.heading("Layers");
    ui.separator();

    if map.layers().is_empty() {
        ui.label("No layers.");
        return action;
    }

    for layer in map.layers().iter().rev() {
        let mut shown = layer.shown;
        if ui.checkbox(&mut shown, &layer.label).changed() {
            action = LayerAction::SetShown(layer.label.clone(), shown);
        }
        let detail = if layer.vis.palette.is_empty() {
            format!(
                "{}  [{}, {}]",
                layer.vis.bands.join("/"),
                layer.vis.min,
                layer.vis.max
            )
        } else {
            format!(
                "{}  [{}, {}]",
                layer.vis.palette.join(" → "),
                layer.vis.min,
                layer.vis.max
            )
        };
        ui.label(RichText::new(detail).small().weak());
        ui.add_space(4.0);
    }

    action
}
