//! dsts binary entry point.

use anyhow::Result;
use clap::Parser;
use dsts::{AppConfig, Application, CliArgs};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // stdout carries the i3bar protocol; logs go to stderr.
    dsts_telemetry::init_logging()?;

    info!("Starting dsts v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::from_env()?;
    args.apply(&mut config);
    info!(?config, "Configuration loaded");

    let app = Application::new(config)?;
    app.run().await?;

    info!("Shutdown complete");
    Ok(())
}
