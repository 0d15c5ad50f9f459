//! Sidebar: title, description, region and date selectors, story and
//! disclaimer.

use chrono::NaiveDate;
use egui::{Color32, RichText, ScrollArea, Ui};
use litterscope_viewer::SelectionController;

const TITLE: &str = "Marine Litter";

const DESCRIPTION: &str = "This prototype leverages artificial intelligence (AI) to identify \
marine litter across various geographic regions. The used AI is based on research published in \
\"Identifying Marine Litter with Deep Learning Techniques\" \
(https://doi.org/10.1016/j.isci.2023.108402) and implemented with code from GitHub. Developed by \
MI4People, the tool aims to facilitate the monitoring and management of marine environments by \
providing an intuitive interface for the visualization of litter distribution. Users can explore \
different regions and time points to assess changes and trends. Additionally, the \"Layers\" \
panel on the right allows users to toggle the visibility of individual map layers for a \
customized viewing experience. Predicted marine litter is highlighted in red.";

const DISCLAIMER: &str = "The information and functionalities provided by this tool are for \
informational purposes only. MI4People makes no warranties regarding the accuracy or reliability \
of the data or visualizations. Use of this tool is at the user's own risk. MI4People is not \
liable for any damages arising from its use. Users are responsible for adhering to copyright and \
license terms of the underlying model and code.";

const TITLE_COLOR: Color32 = Color32::from_rgb(0x00, 0x79, 0x6b);
const HEADING_COLOR: Color32 = Color32::from_rgb(0x00, 0x4d, 0x40);

/// Actions returned from the sidebar.
pub enum SidebarAction {
    SelectRegion(String),
    SelectDate(NaiveDate),
    None,
}

/// Show the sidebar for the controller's current selection.
pub fn show_sidebar(ui: &mut Ui, controller: &SelectionController, busy: bool) -> SidebarAction {
    let mut action = SidebarAction::None;
    let selection = controller.selection();

    ScrollArea::vertical().show(ui, |ui| {
        ui.label(
            RichText::new(TITLE)
                .size(24.0)
                .strong()
                .color(TITLE_COLOR),
        );
        ui.add_space(4.0);
        ui.label(DESCRIPTION);
        ui.add_space(12.0);

        ui.label(
            RichText::new("Select a specific region")
                .size(18.0)
                .strong()
                .color(HEADING_COLOR),
        );
        let current_region = selection.region.as_deref().unwrap_or("Select region");
        egui::ComboBox::from_id_salt("region")
            .selected_text(current_region)
            .width(ui.available_width() - 8.0)
            .show_ui(ui, |ui| {
                for name in controller.catalog().names() {
                    let selected = selection.region.as_deref() == Some(name);
                    if ui.selectable_label(selected, name).clicked() && !selected {
                        action = SidebarAction::SelectRegion(name.to_string());
                    }
                }
            });

        ui.add_space(8.0);
        if !controller.story().is_empty() {
            ui.label(controller.story());
        }
        ui.add_space(8.0);

        ui.label(
            RichText::new("Select a specific date")
                .size(18.0)
                .strong()
                .color(HEADING_COLOR),
        );
        let current_date = selection
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Select timepoint".to_string());
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("date")
                .selected_text(current_date)
                .show_ui(ui, |ui| {
                    for &date in controller.date_options() {
                        let selected = selection.date == Some(date);
                        if ui.selectable_label(selected, date.to_string()).clicked() && !selected {
                            action = SidebarAction::SelectDate(date);
                        }
                    }
                });
            if busy {
                ui.spinner();
            }
        });

        ui.add_space(40.0);
        ui.label(RichText::new(DISCLAIMER).size(11.0).weak());
    });

    action
}
