mod auth;
mod config;
mod db;
mod errors;
mod events;
mod json;
mod models;
mod routes;
mod state;
mod validation;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::service::ensure_admin;
use crate::auth::store::PgUserStore;
use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::db::create_pool;
use crate::events::store::PgEventStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ClubNexus API v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.app_env
    );
    if config.jwt_secret_is_fallback {
        warn!("JWT_SECRET is not set; using the development signing secret");
    }

    // Initialize PostgreSQL (applies migrations)
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    let state = AppState {
        users: Arc::new(PgUserStore::new(db.clone())),
        events: Arc::new(PgEventStore::new(db)),
        tokens: TokenKeys::new(&config.jwt_secret),
    };

    if let Some(seed) = &config.admin_seed {
        ensure_admin(state.users.as_ref(), seed).await?;
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
