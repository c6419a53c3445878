// Redmont Casino - Main Entry Point

use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use redmont_casino::{autosave, handlers::lock, router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🎰 Redmont Casino starting");

    let config = Config::from_env();
    let state = AppState::new(&config).shared();
    let stop = lock(&state).shutdown.clone();
    let app = router(state.clone());

    let saver = autosave::spawn(state.clone(), config.autosave_interval);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("🚀 Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(stop))
        .await?;

    info!("💾 Saving state to disk...");
    saver.shutdown().await;
    info!("👋 Goodbye!");
    Ok(())
}

/// Resolves on Ctrl+C or when the admin shutdown route fires.
async fn shutdown_signal(stop: Arc<Notify>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl+C: {}", e);
                // fall back to the admin route alone
                stop.notified().await;
            } else {
                info!("🛑 Shutdown signal received");
            }
        }
        _ = stop.notified() => info!("🛑 Shutdown requested"),
    }
}
