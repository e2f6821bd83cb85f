use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use eframe::egui;
use tracing::{info, warn};

use heavy_duty::app::TrackerApp;
use heavy_duty::config::Config;
use heavy_duty::logging::init_logging;
use heavy_duty::routines::load_plan;
use heavy_duty::storage::FileStore;
use heavy_duty::Tracker;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    init_logging(&config.log_filter);
    info!(data_dir = %config.data_dir.display(), "starting heavy duty");

    let store = FileStore::open(&config.data_dir)?;
    let plan = load_plan(&config.plan_path());
    let tracker = Tracker::open(store, plan);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Heavy Duty",
        options,
        Box::new(move |cc| {
            if let Some(path) = &config.font_path {
                install_font(&cc.egui_ctx, path);
            }
            Ok(Box::new(TrackerApp::new(cc, tracker, config)))
        }),
    )?;
    Ok(())
}

fn install_font(ctx: &egui::Context, path: &Path) {
    let font_data = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open font file");
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(
        "custom".to_owned(),
        Arc::from(egui::FontData::from_owned(font_data)),
    );
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().insert(0, "custom".to_owned());
    }
    ctx.set_fonts(fonts);
}
