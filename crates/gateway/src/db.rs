use std::str::FromStr;

use {
    sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    },
    tracing::debug,
    webgui_sessions::SqliteSessionStore,
    webgui_settings::SettingsStore,
};

/// Open the SQLite pool, creating the database file if needed.
///
/// In-memory databases live and die with their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let mut pool = SqlitePoolOptions::new();
    if url.contains(":memory:") {
        pool = pool.max_connections(1).idle_timeout(None).max_lifetime(None);
    }
    let pool = pool.connect_with(options).await?;
    debug!(url, "database connected");
    Ok(pool)
}

/// Create every table the gateway needs.
pub async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    SqliteSessionStore::init(pool).await?;
    SettingsStore::init(pool).await?;
    Ok(())
}
