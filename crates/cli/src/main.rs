//! LitterScope CLI: browse the marine litter catalogue from the terminal

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use litterscope_cloud::{StacCatalog, StacClientOptions, StacImagery, StacImageryOptions};
use litterscope_core::{
    Anchor, GeoTiffMaskStore, ImageryService, OfflineImagery, RegionCatalog, parse_date,
    resolve_window,
};
use litterscope_viewer::{
    Composition, Compositor, CompositorOptions, ImageryStatus, MapState, RenderOutcome,
    RenderRequest, SelectionController, Transition,
};
use serde_json::json;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "litterscope")]
#[command(author, version, about = "Marine litter detections over Sentinel-2 imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Region catalogue JSON file (defaults to the built-in catalogue)
    #[arg(long, global = true)]
    regions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List regions with their dates, default date and anchor
    Regions,

    /// Print the imagery window (one day either side) around a date
    Window {
        /// Date as YYYY-MM-DD
        date: String,
    },

    /// Load and validate a region catalogue file
    Validate {
        /// Catalogue JSON file
        file: PathBuf,
        /// Also check that every mask GeoTIFF exists in this directory
        #[arg(long)]
        masks: Option<PathBuf>,
    },

    /// Select a region and date, then print the layers and viewport
    Show {
        /// Region name (defaults to the first region)
        #[arg(short, long)]
        region: Option<String>,
        /// Date as YYYY-MM-DD (defaults to the region's default date)
        #[arg(short, long)]
        date: Option<String>,
        /// Directory holding `<mask id>.tif` files
        #[arg(long, default_value = "masks")]
        masks: PathBuf,
        /// STAC catalog: es (Earth Search), pc (Planetary Computer) or an API URL
        #[arg(long, default_value = "es")]
        catalog: String,
        /// Skip the imagery search and show an empty composite
        #[arg(long)]
        offline: bool,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_catalog(path: Option<&Path>) -> Result<Arc<RegionCatalog>> {
    let catalog = match path {
        Some(path) => RegionCatalog::load(path)
            .with_context(|| format!("Failed to load catalogue {}", path.display()))?,
        None => RegionCatalog::builtin().context("Built-in catalogue is invalid")?,
    };
    debug!(regions = catalog.len(), "catalogue loaded");
    Ok(Arc::new(catalog))
}

fn describe_anchor(anchor: &Anchor) -> String {
    match anchor {
        Anchor::Point(p) => p.to_string(),
        Anchor::DeriveFromMask => "mask footprint".to_string(),
    }
}

fn describe_imagery(status: &ImageryStatus) -> String {
    match status {
        ImageryStatus::Available { scenes } => format!("{scenes} scene(s)"),
        ImageryStatus::NoScenes => "no scenes".to_string(),
        ImageryStatus::Unavailable { reason } => format!("unavailable ({reason})"),
    }
}

/// Initialise the controller, then apply the requested region and date.
/// Only the last transition's request is still live.
fn select(
    controller: &mut SelectionController,
    region: Option<&str>,
    date: Option<&str>,
) -> Result<Transition> {
    let mut transition = controller.initialize()?;
    let mut notifications = std::mem::take(&mut transition.notifications);

    if let Some(region) = region {
        let mut next = controller.select_region(region)?;
        notifications.append(&mut next.notifications);
        transition = next;
    }
    if let Some(date) = date {
        let mut next = controller.select_date(parse_date(date)?)?;
        notifications.append(&mut next.notifications);
        transition = next;
    }

    transition.notifications = notifications;
    Ok(transition)
}

async fn compose<I: ImageryService>(
    imagery: I,
    masks: GeoTiffMaskStore,
    request: &RenderRequest,
) -> Result<(Composition, MapState)> {
    let compositor = Compositor::new(imagery, masks, CompositorOptions::default());
    let mut map = MapState::new();
    match compositor.render(request, &mut map).await? {
        RenderOutcome::Rendered(composition) => Ok((composition, map)),
        RenderOutcome::Superseded { generation } => {
            anyhow::bail!("Render {} was superseded", generation)
        }
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

fn list_regions(catalog: &RegionCatalog) {
    for region in catalog.iter() {
        let dates: Vec<String> = region.dates.iter().map(|d| d.to_string()).collect();
        println!("{}", region.name);
        println!("  Dates:   {}", dates.join(", "));
        println!("  Default: {}", region.default_date);
        println!("  Anchor:  {}", describe_anchor(&region.anchor));
        if !region.story.is_empty() {
            println!("  Story:   {}", region.story);
        }
    }
}

fn validate(file: &Path, masks: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(Some(file))?;
    let mask_count: usize = catalog.iter().map(|r| r.masks.len()).sum();

    if let Some(dir) = masks {
        let store = GeoTiffMaskStore::new(dir);
        let missing: Vec<String> = catalog
            .iter()
            .flat_map(|r| r.masks.iter())
            .filter(|m| !store.path_for(m).exists())
            .map(|m| m.to_string())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "{} mask(s) missing under {}: {}",
                missing.len(),
                dir.display(),
                missing.join(", ")
            );
        }
    }

    println!(
        "{}: {} region(s), {} mask(s)",
        file.display(),
        catalog.len(),
        mask_count
    );
    Ok(())
}

struct ShowArgs {
    region: Option<String>,
    date: Option<String>,
    masks: PathBuf,
    catalog: String,
    offline: bool,
    json: bool,
}

fn show(catalog: Arc<RegionCatalog>, args: ShowArgs) -> Result<()> {
    let mut controller = SelectionController::new(catalog);
    let transition = select(
        &mut controller,
        args.region.as_deref(),
        args.date.as_deref(),
    )?;
    for notification in &transition.notifications {
        debug!(?notification, "selection changed");
    }
    let request = transition.render;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let masks = GeoTiffMaskStore::new(&args.masks);

    let start = Instant::now();
    let pb = spinner("Searching imagery...");
    let composed = if args.offline {
        runtime.block_on(compose(OfflineImagery, masks, &request))
    } else {
        let imagery = StacImagery::new(
            StacCatalog::from_str_or_url(&args.catalog),
            StacClientOptions::default(),
            StacImageryOptions::default(),
        )?;
        runtime.block_on(compose(imagery, masks, &request))
    };
    pb.finish_and_clear();
    let (composition, map) = composed?;
    info!("Composed in {:.2?}", start.elapsed());
    controller.complete(composition.generation);

    if args.json {
        let layers: Vec<_> = composition
            .layers
            .iter()
            .map(|l| {
                json!({
                    "label": l.label,
                    "image": l.image.to_string(),
                    "vis": l.vis,
                    "shown": l.shown,
                })
            })
            .collect();
        let report = json!({
            "region": request.region,
            "date": request.date,
            "dates": controller.date_options(),
            "story": controller.story(),
            "mask": composition.mask,
            "window": {
                "start": composition.window.start_str(),
                "end": composition.window.end_str(),
            },
            "imagery": composition.imagery,
            "layers": layers,
            "viewport": map.viewport(),
            "notice": map.notice(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Region: {}", request.region);
    if !controller.story().is_empty() {
        println!("Story:  {}", controller.story());
    }
    println!("Date:   {}", request.date);
    println!("Mask:   {}", composition.mask);
    println!("Window: {}", composition.window);
    println!("Imagery: {}", describe_imagery(&composition.imagery));
    println!("\nLayers (bottom to top):");
    for layer in &composition.layers {
        println!("  {}", layer.label);
        println!("    Image: {}", layer.image);
        if layer.vis.palette.is_empty() {
            println!(
                "    Bands: {}  range {}..{}",
                layer.vis.bands.join(", "),
                layer.vis.min,
                layer.vis.max
            );
        } else {
            println!(
                "    Palette: {}  range {}..{}",
                layer.vis.palette.join(", "),
                layer.vis.min,
                layer.vis.max
            );
        }
    }
    if let Some(viewport) = map.viewport() {
        println!("\nViewport: {} zoom {}", viewport.center, viewport.zoom);
    }
    if let Some(notice) = map.notice() {
        println!("Notice: {}", notice);
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Regions => {
            let catalog = load_catalog(cli.regions.as_deref())?;
            list_regions(&catalog);
        }

        Commands::Window { date } => {
            let (start, end) = resolve_window(&date)?;
            println!("[{}, {})", start, end);
        }

        Commands::Validate { file, masks } => validate(&file, masks.as_deref())?,

        Commands::Show {
            region,
            date,
            masks,
            catalog,
            offline,
            json,
        } => {
            let regions = load_catalog(cli.regions.as_deref())?;
            show(
                regions,
                ShowArgs {
                    region,
                    date,
                    masks,
                    catalog,
                    offline,
                    json,
                },
            )?;
        }
    }

    Ok(())
}
