mod app;
mod charts;
mod color;
mod config;
mod data;
mod server;
mod service;
mod state;
mod ui;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use app::DashboardApp;
use clap::Parser;
use config::Config;
use eframe::egui;
use service::DashboardService;
use state::AppState;

fn main() -> Result<()> {
    let config = Config::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level()))
        .init();

    run(config).inspect_err(|e| log::error!("{e:#}"))
}

fn run(config: Config) -> Result<()> {
    let records = data::loader::load_file(&config.data)?;
    let service = DashboardService::new(records);

    if config.serve {
        serve(service, config.bind_addr())
    } else {
        run_desktop(service, config.data)
    }
}

/// Run the HTTP front end on a single-threaded runtime.
fn serve(service: DashboardService, addr: SocketAddr) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime
        .block_on(server::run(service, addr))
        .with_context(|| format!("serving on {addr}"))
}

fn run_desktop(service: DashboardService, data_path: PathBuf) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Electric Vehicle Adoption Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(AppState::new(service, data_path))))),
    )
    .map_err(|e| anyhow::anyhow!("running desktop window: {e}"))
}
