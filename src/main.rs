mod app;
mod color;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use eframe::egui;
use rusty_sales::config::DashboardConfig;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::resolve(std::env::args().skip(1))?;

    // No dashboard without data: a bad source aborts before any window opens.
    let state = AppState::load(config.clone())
        .with_context(|| format!("loading {}", config.source.path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}
