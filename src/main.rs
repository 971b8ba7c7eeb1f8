mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::ResidueGalleryApp;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    // Config is read before logging is up so its filter can seed env_logger.
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.filter.as_str()),
    )
    .init();

    if let Some(e) = config_error {
        log::error!("Ignoring invalid configuration: {e:#}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Residue Gallery",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render file:// PNGs.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(ResidueGalleryApp::new(&config)))
        }),
    )
}
