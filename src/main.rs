mod app;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eframe::egui;

use inque_orb::dom::parser::parse_html;
use inque_orb::store::{JsonFileStore, MemoryStore, PreferenceStore};
use inque_orb::{EventBus, FloatingOrb, OrbConfig, OrbContext, ProfileHub};

use app::hub::DemoHub;
use app::OrbApp;

/// Home page the orb docks into when no `--page` is given.
const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>inque</title></head>
<body>
  <header class="home-header">
    <div id="title-container" class="title-main-container">
      <h1 class="title-main">inque</h1>
      <p id="home-subtitle">widgets, profiles and a studio to make them</p>
    </div>
  </header>
  <main id="feed"></main>
</body>
</html>"#;

#[derive(Parser)]
#[command(name = "inque-orb", about = "Floating orb navigation, hosted in egui")]
struct Args {
    /// Orb config (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTML page to dock the orb into
    #[arg(short, long)]
    page: Option<PathBuf>,

    /// Preference file (JSON); in-memory when omitted
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Sphere enhancement module URL
    #[arg(long)]
    sphere_url: Option<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let app = match build_app(&args) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("inque-orb: {e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native("inque \u{00B7} floating orb", options, Box::new(|_cc| Ok(Box::new(app)))) {
        log::error!("egui host failed: {}", e);
        std::process::exit(1);
    }
}

fn build_app(args: &Args) -> inque_orb::Result<OrbApp> {
    let mut config = match &args.config {
        Some(path) => OrbConfig::load(path)?,
        None => OrbConfig::default(),
    };
    if let Some(url) = &args.sphere_url {
        config = config.with_sphere_url(url.as_str());
    }

    let html = match &args.page {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEMO_PAGE.to_string(),
    };
    let mut doc = parse_html(&html);

    let store: Box<dyn PreferenceStore> = match &args.prefs {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    };

    let bus = EventBus::new();
    let hub = Arc::new(DemoHub::new(bus.clone()));
    let ctx = OrbContext::new(bus)
        .with_hub(hub.clone() as Arc<dyn ProfileHub>)
        .with_store(store);

    let orb = FloatingOrb::init(&mut doc, config, ctx, 0.0);
    Ok(OrbApp::new(doc, orb, hub))
}
