#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

mod app;
mod charts;
mod config;
mod constants;
mod data;
mod error;
mod fetch;
mod state;
mod ui;
mod widgets;

use app::ProfileOxide;
use config::DashboardConfig;
use constants::config::CONFIG_FILE;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = {
        puffin::set_scopes_on(true);
        let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        match puffin_http::Server::new(&addr) {
            Ok(server) => {
                log::info!("puffin server listening on {}", addr);
                Some(server)
            }
            Err(e) => {
                log::warn!("could not start puffin server: {}", e);
                None
            }
        }
    };

    let config_path = PathBuf::from(CONFIG_FILE);
    let config = DashboardConfig::load_or_default(&config_path);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ProfileOxide - Profiling Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(ProfileOxide::new(config, config_path)))),
    )
}
