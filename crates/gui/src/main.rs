//! LitterScope Desktop GUI
//!
//! Browse marine litter detections by region and date over Sentinel-2
//! true-colour composites.

mod app;
mod panels;
mod state;
mod worker;

use std::path::PathBuf;

use app::LitterScopeApp;
use clap::Parser;

/// Command-line options for the desktop app.
#[derive(Parser, Debug, Clone)]
#[command(name = "litterscope-gui", version, about = "Marine litter map viewer", long_about = None)]
pub struct Options {
    /// Region catalogue JSON file (defaults to the built-in catalogue)
    #[arg(long)]
    pub regions: Option<PathBuf>,
    /// Directory holding `<mask id>.tif` files
    #[arg(long, default_value = "masks")]
    pub masks: PathBuf,
    /// STAC catalog: es (Earth Search), pc (Planetary Computer) or an API URL
    #[arg(long, default_value = "es")]
    pub catalog: String,
    /// Skip the imagery search
    #[arg(long)]
    pub offline: bool,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let options = Options::parse();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LitterScope: Marine Litter")
            .with_inner_size([1300.0, 850.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LitterScope",
        native_options,
        Box::new(|cc| Ok(Box::new(LitterScopeApp::new(cc, options)?))),
    )
}
