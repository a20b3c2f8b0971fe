mod logs;

use pmoconfig::get_config;
use pmofrancetv::{ContentResolver, FranceTvAddon, create_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration ==========
    let config = get_config();
    logs::init_logging(&config);

    let port = config.get_http_port();
    let base_url = config.get_base_url();

    // ========== PHASE 2 : Add-on ==========
    let resolver = ContentResolver::from_config(&config)?;
    let addon = FranceTvAddon::new(Arc::new(resolver));
    let manifest = addon.manifest();
    let router = create_router(addon);

    // ========== PHASE 3 : Démarrage du serveur ==========
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("========================================");
    info!("{} add-on v{} started", manifest.name, manifest.version);
    info!("Port: {}", port);
    info!("Public URL: {}", base_url);
    info!("Manifest: {}/manifest.json", base_url);
    info!("========================================");
    info!("Available catalogs:");
    for catalog in &manifest.catalogs {
        info!("  - {} ({})", catalog.name, catalog.id);
    }
    info!("========================================");
    warn!("Some DRM-protected content cannot be played");
    info!("Press Ctrl+C to stop...");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C reçu, arrêt gracieux");
}
