use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use technician_booking::config::AppConfig;
use technician_booking::db::{self, SqliteBookingStore};
use technician_booking::handlers;
use technician_booking::services::clock::SystemClock;
use technician_booking::services::session::SessionStore;
use technician_booking::state::AppState;

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>().with_context(|| format!("invalid CORS origin '{o}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    if config.seed_sample_bookings {
        db::seed_sample_bookings(&conn)?;
    }

    let state = Arc::new(AppState {
        store: Arc::new(SqliteBookingStore::new(conn)),
        sessions: SessionStore::new(config.session_ttl_minutes),
        clock: Arc::new(SystemClock),
    });

    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let expired = sweeper.sessions.expire_idle();
            if expired > 0 {
                tracing::debug!(expired, "dropped idle sessions");
            }
        }
    });

    let app = handlers::routes(state)
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
