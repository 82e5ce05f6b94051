//! RoomShare marketplace server

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomshare_server::{
    routes, AppState, Config, ConsoleEmailSender, EmailSender, InMemoryMarketStore,
    InMemorySessionStore, MarketStore, RequestService, SessionStore, SqliteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomshare_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    let port = config.port;
    let app = match config.database_path.clone() {
        Some(path) => {
            let db = Arc::new(SqliteStore::open(&path)?);
            tracing::info!(path = %path, "Using SQLite store");
            build_app(AppState::from_shared(
                db.clone(),
                db,
                ConsoleEmailSender::new(),
                config,
            ))
        }
        None => {
            tracing::info!("Using in-memory store");
            build_app(AppState::new(
                InMemoryMarketStore::new(),
                InMemorySessionStore::new(),
                ConsoleEmailSender::new(),
                config,
            ))
        }
    };

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("RoomShare listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Repair half-applied acceptances and drop stale codes, then build the router
fn build_app<M, S, E>(state: AppState<M, S, E>) -> Router
where
    M: MarketStore + 'static,
    S: SessionStore + 'static,
    E: EmailSender + 'static,
{
    match RequestService::new(state.store.as_ref()).reconcile_accepted_requests() {
        Ok(report) => tracing::info!(?report, "Reconciled accepted requests"),
        Err(e) => tracing::error!(error = %e, "Reconciliation failed"),
    }

    match state
        .store
        .cleanup_expired_pending(state.config.verification_ttl_minutes)
    {
        Ok(swept) => tracing::info!(swept, "Dropped expired verification codes"),
        Err(e) => tracing::error!(error = %e, "Verification code cleanup failed"),
    }

    routes::create_router(Arc::new(state))
}
