//! phx-db
//!
//! Persistence adapter for the streak tracker. The daemon talks to storage
//! exclusively through the [`Store`] trait; [`PgStore`] is the production
//! Postgres implementation backed by sqlx with embedded migrations.
//! `get_*` calls return `Ok(None)` for absence — only genuine storage
//! failures surface as errors.

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

mod clock;
mod pg;
mod store;

pub use clock::{Clock, SystemClock};
pub use pg::PgStore;
pub use store::Store;

pub const ENV_DB_URL: &str = "PHX_DATABASE_URL";

/// Connect to Postgres using PHX_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations (schema + catalog seed).
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}
