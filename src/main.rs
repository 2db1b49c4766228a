//! ID Analysis Workbench - Main Entry Point
//!
//! Sets up logging, loads the configuration and runs the egui application.

use anyhow::Context;
use idanalysis_rs::{app::create_app, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Console logging plus a daily rolling file when a data dir exists
    let (file_layer, _guard) = match config::log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "idanalysis.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,idanalysis_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Starting ID Analysis Workbench");

    let config = config::AppConfig::load_or_default();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("ID Analysis Workbench"),
        ..Default::default()
    };

    eframe::run_native(
        "ID Analysis Workbench",
        native_options,
        Box::new(|cc| Ok(Box::new(create_app(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("Failed to run the workbench window")?;

    tracing::info!("Shutting down...");
    Ok(())
}
