//! tactiled — tactile codec bridge daemon.

use anyhow::{Context, Result};

use tactile_core::config::TactileConfig;
use tactile_core::DeltaModulator;

mod bridge;
mod net;

use bridge::Bridge;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = TactileConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = TactileConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        TactileConfig::default()
    });

    tracing::info!(
        bind = %config.network.bind_addr,
        server = %config.network.server_addr,
        client = %config.network.client_addr,
        points = config.codec.point_count,
        frames = config.codec.frame_count,
        buffer_size = config.network.buffer_size,
        strict_trailing = config.codec.strict_trailing,
        "tactiled starting"
    );

    let socket = net::bind_socket(config.network.bind_addr, config.network.buffer_size)
        .context("failed to bind bridge socket")?;
    let bridge = Bridge::new(DeltaModulator::default(), &config);

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let bridge_task = tokio::spawn(net::bridge_loop(
        socket,
        bridge,
        config.network.buffer_size,
        shutdown_tx.subscribe(),
    ));

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = bridge_task        => tracing::error!("bridge task exited: {:?}", r),
    }

    Ok(())
}
