//! chatmem server binary.

use anyhow::Context;
use chatmem::config::{ChatmemConfig, ConfigLayerSource, LayeredConfigOptions};
use chatmem::{build_router, init_logging};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use tokio::net::TcpListener;

/// Command-line options for the chatmem server.
#[derive(Parser)]
#[command(name = "chatmem", version)]
struct Cli {
    /// Optional path to a chatmem.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, overriding server.bind
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    info!(
        "starting chatmem (config_set={}, bind_set={})",
        cli.config.is_some(),
        cli.bind.is_some()
    );

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = &cli.config {
        options = options.with_config_path(path);
    }
    let layered = ChatmemConfig::load_layered_with_options(options)
        .context("failed to load configuration")?;
    for layer in &layered.layers {
        match layer.source {
            ConfigLayerSource::File => {
                info!("config layer loaded (source=file, path={:?})", layer.path)
            }
            ConfigLayerSource::Environment => info!("config layer loaded (source=environment)"),
        }
    }

    let mut config = layered.config;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let router = build_router(&config);
    let listener = TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!("listening (addr={})", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
