//! steam-presence-bridge - Steam presence poller
//!
//! Polls a Steam community profile feed on a heartbeat and mirrors the
//! presence into a status selector and a game name text device.

mod config;
mod error;
mod host;
mod models;
mod plugin;
mod runtime;
mod steam;

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use crate::host::MemoryHost;
use crate::plugin::SteamPlugin;
use crate::runtime::HostRuntime;
use crate::steam::SteamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Subscriber goes in before the config load so its warnings are kept.
    // Without RUST_LOG the filter is swapped once the debug mask is known.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new("steam_presence_bridge=info")),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::load()?;
    if !from_env {
        filter_handle.reload(EnvFilter::new(config.log_filter()))?;
    }

    tracing::info!("Starting steam-presence-bridge...");

    let client = SteamClient::new(&config.steam)?;
    let plugin = SteamPlugin::new(MemoryHost::new(), &config);
    let params = config.host_parameters();

    let plugin = HostRuntime::new(plugin, client)
        .run(&params, shutdown_signal())
        .await;

    tracing::info!(
        "Stopped polling '{}' after {} device writes",
        plugin.steam_id(),
        plugin.host().write_count()
    );
    for device in plugin.host().devices() {
        tracing::info!(
            "Device {} '{}' ({}, image {:?}): nValue={}, sValue='{}', updated {}",
            device.unit,
            device.name,
            device.kind,
            device.image,
            device.n_value,
            device.s_value,
            device
                .last_update
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string())
        );
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
