//! Server Configuration
//!
//! Environment-driven configuration. `DATABASE_URL` points at the SQLite
//! store (a local file by default), `SERVER_PORT` selects the listen port,
//! and `JWT_SECRET` is read by the auth module.

use sqlx::SqlitePool;

use crate::backend::store::schema;

/// Default listen port, matching the platform's dev setup
pub const DEFAULT_PORT: u16 = 4000;

/// Resolve the listen port from `SERVER_PORT`
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Connect to the database and apply the schema
///
/// Reads `DATABASE_URL`, falling back to a local SQLite file. Unlike the
/// HTTP-only parts of the platform, the realtime core cannot run without its
/// store, so failures here abort startup.
pub async fn load_database() -> Result<SqlitePool, sqlx::Error> {
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::warn!("DATABASE_URL not set, using local sqlite file");
        "sqlite://squadhub.db?mode=rwc".to_string()
    });

    tracing::info!("Connecting to database...");
    let pool = schema::connect(&database_url).await?;
    tracing::info!("Database connection pool created");

    schema::init_schema(&pool).await?;
    tracing::info!("Database schema ready");

    Ok(pool)
}
