mod api;
mod config;
mod error;
mod ui;

use api::bridge::ScriptBridge;
use clap::Parser;
use config::{AppConfig, Args};
use env_logger::Builder;
use log::{info, LevelFilter};
use std::error::Error;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use ui::core::dates::DateRange;
use ui::core::export::DirectorySink;
use ui::core::orchestrator::SectionOrchestrator;
use ui::dashboard::Dashboard;

fn init_logging(config: &AppConfig) -> Result<(), error::WhaleScopeError> {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info) // Dependencies stay at Info
        .filter_module("whalescope", config.log_level)
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        });

    match &config.log_file {
        // Keep logs off the terminal the dashboard draws on
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .write_style(env_logger::WriteStyle::Never);
        }
        None => {
            builder
                .target(env_logger::Target::Stderr)
                .write_style(env_logger::WriteStyle::Always);
        }
    }

    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::try_from(Args::parse())?;
    init_logging(&config)?;

    info!("Starting WhaleScope...");

    let bridge = ScriptBridge::new(&config.python, &config.scripts_dir).with_timeout(config.timeout);
    let orchestrator = SectionOrchestrator::new(Arc::new(bridge));
    let sink = Arc::new(DirectorySink::new(&config.export_dir));
    info!(
        "Scripts in {} via {}, exports to {}",
        config.scripts_dir.display(),
        config.python.display(),
        sink.dir().display()
    );

    let dashboard = Dashboard::new(
        orchestrator,
        sink,
        config.section,
        DateRange::default_window(),
    );

    let dashboard_handle = tokio::spawn(async move {
        if let Err(e) = dashboard.run().await {
            log::error!("Dashboard error: {}", e);
        }
    });

    dashboard_handle.await?;

    info!("Shutdown complete");
    Ok(())
}
