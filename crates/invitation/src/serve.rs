//! Server lifecycle: open the guestbook, build the router, serve until a
//! shutdown signal arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use guestbook::{StoreConfig, WishStore};
use guestconf::InvitationConfig;
use tracing::info;

use crate::quote::{self, QuoteProvider};
use crate::web::{self, WebState};

/// Run the invitation server
pub async fn run(config: InvitationConfig) -> Result<()> {
    let paths = &config.infra.paths;
    info!("💌 Invitation server starting");
    info!("   Data: {}", paths.data_dir.display());
    info!("   Site: {}", paths.static_dir.display());

    if !paths.static_dir.join("index.html").is_file() {
        tracing::warn!(
            static_dir = %paths.static_dir.display(),
            "index.html not found, the site will answer 404"
        );
    }

    let store_config = StoreConfig::with_data_dir(paths.data_dir.clone());
    let store = tokio::task::spawn_blocking(move || WishStore::open(store_config))
        .await
        .context("Guestbook initialization task failed")?
        .context("Failed to open guestbook")?;
    info!("   Guestbook: {}", store.path().display());

    let quotes: Arc<dyn QuoteProvider> = Arc::from(quote::provider_for(&config.site.quote)?);

    let state = WebState::new(Arc::new(store), quotes, config.site.event.clone());
    let app = web::router(state, &paths.static_dir);

    let addr = config.infra.bind.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("💌 Invitation ready!");
    info!("   Site: http://{}/", addr);
    info!("   API: http://{}/api/wishes", addr);
    info!("   Health: GET http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, relying on Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
