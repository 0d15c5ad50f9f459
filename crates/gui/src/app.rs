//! Main application: LitterScopeApp implements eframe::App.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use egui::TextureHandle;
use litterscope_core::{GeoTiffMaskStore, RegionCatalog, Result};
use litterscope_viewer::{
    Composition, Compositor, CompositorOptions, ImageryStatus, MapState, Notification,
    RenderRequest, SelectionController, Transition, ViewerEvent,
};
use tracing::{debug, info, warn};

use crate::Options;
use crate::panels::console::show_console;
use crate::panels::layers::{LayerAction, show_layers};
use crate::panels::map_view::{MapLayers, MapViewState, show_map_view};
use crate::panels::sidebar::{SidebarAction, show_sidebar};
use crate::state::{AppMessage, LogBuffer, LogEntry, MaskOverlay};
use crate::worker::{AppCompositor, Imagery, spawn_render};

/// The main application state.
pub struct LitterScopeApp {
    /// Message channels for background thread communication.
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,

    controller: SelectionController,
    compositor: Arc<AppCompositor>,

    /// Layers, viewport and notice of the last applied render.
    map: MapState,
    composition: Option<Composition>,
    overlay: Option<MaskOverlay>,
    overlay_texture: Option<TextureHandle>,
    map_view: MapViewState,

    /// Console log entries.
    logs: LogBuffer,

    /// The latest request, until its result arrives.
    pending: Option<RenderRequest>,
    /// Whether the current request is still rendering.
    busy: bool,

    ctx: egui::Context,
}

impl LitterScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: Options) -> Result<Self> {
        let mut logs = LogBuffer::default();
        logs.push(LogEntry::info("LitterScope started"));

        let catalog = match &options.regions {
            Some(path) => RegionCatalog::load(path)?,
            None => RegionCatalog::builtin()?,
        };
        logs.push(LogEntry::info(format!(
            "{} regions in catalogue",
            catalog.len()
        )));

        let imagery = match Imagery::new(options.offline, &options.catalog) {
            Ok(imagery) => imagery,
            Err(e) => {
                warn!(error = %e, "falling back to offline imagery");
                logs.push(LogEntry::error(format!(
                    "Imagery client unavailable, running offline: {e}"
                )));
                Imagery::new(true, &options.catalog)?
            }
        };
        if options.offline {
            logs.push(LogEntry::warning("Offline: composites will be empty"));
        }
        let compositor = Compositor::new(
            imagery,
            GeoTiffMaskStore::new(&options.masks),
            CompositorOptions::default(),
        );

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut app = Self {
            tx,
            rx,
            controller: SelectionController::new(Arc::new(catalog)),
            compositor: Arc::new(compositor),
            map: MapState::new(),
            composition: None,
            overlay: None,
            overlay_texture: None,
            map_view: MapViewState::default(),
            logs,
            pending: None,
            busy: false,
            ctx: cc.egui_ctx.clone(),
        };

        let first = app.controller.initialize()?;
        app.launch(first);
        Ok(app)
    }

    /// Report a transition's notifications and start rendering its request.
    fn launch(&mut self, transition: Transition) {
        for notification in &transition.notifications {
            match notification {
                Notification::RegionChanged { region, dates, .. } => {
                    self.logs.push(LogEntry::info(format!(
                        "Region: {} ({} dates)",
                        region,
                        dates.len()
                    )));
                }
                Notification::DateChanged { date, window, .. } => {
                    self.logs.push(LogEntry::info(format!(
                        "Date: {}, imagery window {}",
                        date, window
                    )));
                }
            }
        }

        let request = transition.render;
        info!(
            region = %request.region,
            date = %request.date,
            generation = request.generation,
            "render requested"
        );
        self.busy = true;
        self.pending = Some(request.clone());
        spawn_render(
            Arc::clone(&self.compositor),
            request,
            self.tx.clone(),
            self.ctx.clone(),
        );
    }

    fn handle_event(&mut self, event: ViewerEvent) {
        match self.controller.dispatch(event) {
            Ok(transition) => self.launch(transition),
            Err(e) => self.logs.push(LogEntry::warning(e.to_string())),
        }
    }

    /// Process pending messages from render workers.
    fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::RenderReady {
                    composition,
                    overlay,
                } => {
                    if !self.controller.complete(composition.generation) {
                        debug!(generation = composition.generation, "stale render dropped");
                        continue;
                    }
                    self.busy = false;
                    self.pending = None;
                    composition.apply(&mut self.map);
                    self.overlay = overlay;
                    self.overlay_texture = None;
                    self.map_view.reset();

                    let imagery = match &composition.imagery {
                        ImageryStatus::Available { scenes } => format!("{scenes} scene(s)"),
                        ImageryStatus::NoScenes => "no scenes".to_string(),
                        ImageryStatus::Unavailable { .. } => "imagery unavailable".to_string(),
                    };
                    self.logs.push(LogEntry::success(format!(
                        "Rendered {} ({})",
                        composition.mask, imagery
                    )));
                    if let Some(notice) = self.map.notice() {
                        self.logs.push(LogEntry::warning(notice));
                    }
                    if self.overlay.is_none() {
                        self.logs
                            .push(LogEntry::warning("Litter overlay could not be drawn"));
                    }
                    self.composition = Some(*composition);
                }

                AppMessage::Superseded { generation } => {
                    debug!(generation, "render superseded");
                }

                AppMessage::RenderFailed {
                    generation,
                    message,
                } => {
                    if self.controller.complete(generation) {
                        self.busy = false;
                        // Drop the previous selection's layers
                        if let Some(request) = self.pending.take() {
                            self.compositor.show_failure(&request, &message, &mut self.map);
                        }
                        self.composition = None;
                        self.overlay = None;
                        self.overlay_texture = None;
                        self.map_view.reset();
                        self.logs.push(LogEntry::error(message));
                    }
                }
            }
        }
    }
}

impl eframe::App for LitterScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        // Keep the spinner moving while a render is in flight
        if self.busy {
            ctx.request_repaint();
        }

        let mut sidebar_action = SidebarAction::None;
        egui::SidePanel::left("sidebar")
            .exact_width(350.0)
            .show(ctx, |ui| {
                sidebar_action = show_sidebar(ui, &self.controller, self.busy);
            });
        match sidebar_action {
            SidebarAction::SelectRegion(name) => {
                self.handle_event(ViewerEvent::RegionSelected(name))
            }
            SidebarAction::SelectDate(date) => self.handle_event(ViewerEvent::DateSelected(date)),
            SidebarAction::None => {}
        }

        let mut layer_action = LayerAction::None;
        egui::SidePanel::right("layers")
            .default_width(220.0)
            .show(ctx, |ui| {
                layer_action = show_layers(ui, &self.map);
            });
        if let LayerAction::SetShown(label, shown) = layer_action {
            self.map.set_shown(&label, shown);
        }

        egui::TopBottomPanel::bottom("console")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                show_console(ui, self.logs.entries());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let layers = MapLayers {
                aoi: self.composition.as_ref().map(|c| &c.aoi),
                overlay: self.overlay.as_ref(),
                overlay_label: &self.compositor.options().litter_label,
            };
            show_map_view(
                ui,
                &self.map,
                layers,
                &mut self.overlay_texture,
                &mut self.map_view,
                ctx,
            );
        });
    }
}
