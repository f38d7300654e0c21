//! phx-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, connects Postgres,
//! runs migrations, seeds the singleton state row on first boot, wires
//! middleware, and starts the HTTP server. All route handlers live in
//! `routes.rs`; all shared state lives in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use phx_daemon::{routes, state::AppState};
use phx_db::{PgStore, Store};
use phx_schemas::UserState;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let pool = phx_db::connect_from_env().await?;
    phx_db::migrate(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    seed_singleton_state(store.as_ref()).await?;

    let shared = Arc::new(AppState::with_system_clock(store));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8808)));
    info!("phx-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

/// Create the singleton user-state row on first boot; a fresh streak starts
/// the moment the daemon first comes up.
async fn seed_singleton_state(store: &dyn Store) -> anyhow::Result<()> {
    if store.get_user_state().await?.is_none() {
        let now = chrono::Utc::now();
        store.put_user_state(&UserState::fresh(now)).await?;
        info!("seeded fresh user state at {now}");
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("PHX_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins (the web UI is served locally).
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
