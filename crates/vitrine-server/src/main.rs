use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vitrine_core::storage::{self, StorageSettings};
use vitrine_db::{Database, DatabaseConfig};
use vitrine_server::auth::SessionCookieGuard;
use vitrine_server::routes;
use vitrine_server::state::AppState;

// The storage token backfill writes the process environment, which is only sound
// before any other thread exists, so the runtime is built after it.
fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vitrine=info".parse()?))
        .with_target(false)
        .init();

    let backfill = storage::ensure_canonical_env();
    tracing::info!(?backfill, "blob storage token resolved");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve())
}

async fn serve() -> anyhow::Result<()> {
    let port = std::env::var("VITRINE_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let session_token = std::env::var("ADMIN_SESSION_TOKEN").ok();
    if session_token.as_deref().is_none_or(str::is_empty) {
        tracing::warn!("ADMIN_SESSION_TOKEN not set, admin routes will answer 403");
    }

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let storage = StorageSettings::from_env();
    tracing::info!(
        blob_storage = storage.token_present,
        single_video_upload_only = storage.single_video_upload_only,
        "storage settings loaded"
    );

    let state = Arc::new(AppState {
        db,
        auth: Arc::new(SessionCookieGuard::new(session_token)),
        storage,
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
