mod app;
mod color;
mod state;
mod ui;

use app::RustyDashApp;
use eframe::egui;
use rusty_dash::settings::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::discover().unwrap_or_else(|e| {
        log::warn!("{:#}; using default settings", anyhow::Error::from(e));
        Settings::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    // Optional first argument: a dataset to open at start-up.
    let initial = std::env::args_os().nth(1).map(std::path::PathBuf::from);

    eframe::run_native(
        "Rusty Dash – Data Dashboard",
        options,
        Box::new(move |_cc| {
            let mut app = RustyDashApp::new(settings);
            if let Some(path) = initial {
                app.state.open_path(&path);
            }
            Ok(Box::new(app))
        }),
    )
}
