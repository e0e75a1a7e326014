mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use backend_bridge::runtime::{launch, GatewaySource};
use clap::Parser;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::TallerApp;

#[derive(Parser, Debug)]
#[command(name = "taller-desktop", about = "Tablero de reparaciones de computadoras")]
struct Args {
    /// Base URL of the REST gateway that exposes the `reparaciones` table.
    #[arg(long, env = "TALLER_GATEWAY_URL", default_value = "http://127.0.0.1:8443")]
    gateway_url: String,

    #[arg(long, env = "TALLER_API_KEY")]
    api_key: Option<String>,

    /// Use an in-memory gateway seeded with sample repairs.
    #[arg(long)]
    demo: bool,
}

impl Args {
    fn gateway_source(&self) -> GatewaySource {
        if self.demo {
            GatewaySource::Demo
        } else {
            GatewaySource::Rest {
                base_url: self.gateway_url.clone(),
                api_key: self.api_key.clone(),
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let source = args.gateway_source();
    tracing::info!(gateway = %source.describe(), "starting desktop board");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _backend = launch(source, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gestión de Reparaciones")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Gestión de Reparaciones",
        options,
        Box::new(|_cc| Ok(Box::new(TallerApp::new(cmd_tx, ui_rx)))),
    )
}
