use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::env;
use std::str::FromStr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub dev_admin_token: Option<String>,
    pub dev_user_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:turnstile.db".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(3001),
            dev_admin_token: env::var("DEV_ADMIN_TOKEN").ok(),
            dev_user_token: env::var("DEV_USER_TOKEN").ok(),
        }
    }
}

/// Opens the SQLite pool and applies the pragmas the engine depends on.
/// WAL lets readers run alongside the single writer; the busy timeout keeps
/// short write collisions from surfacing as `database is locked` errors.
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 10000").execute(&pool).await?;

    Ok(pool)
}
