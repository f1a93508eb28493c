//! SQLite connection pool management and schema setup

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Ledger schema, applied idempotently at startup
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS invites (
    code          TEXT PRIMARY KEY,
    guild_id      INTEGER NOT NULL,
    owner_user_id INTEGER NOT NULL,
    uses          INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS join_events (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id       INTEGER NOT NULL,
    joined_user_id INTEGER NOT NULL,
    inviter_code   TEXT NOT NULL,
    ts             INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_invites_guild_owner ON invites (guild_id, owner_user_id);
CREATE INDEX IF NOT EXISTS idx_join_events_guild_code ON join_events (guild_id, inviter_code);
";

/// Database configuration for connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite file path, `sqlite:` URL, or `sqlite::memory:`
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime of a connection
    pub max_lifetime: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("referrals.db"),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(300)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

impl DatabaseConfig {
    /// Config for a SQLite file or URL with default pool settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Private in-memory database
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the
    /// pool holds exactly one connection and never recycles it.
    pub fn in_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            max_connections: 1,
            idle_timeout: None,
            max_lifetime: None,
            ..Default::default()
        }
    }

    /// Check if the database lives in memory
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        let options = if self.url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.url)?
        } else {
            SqliteConnectOptions::new().filename(&self.url)
        };

        let options = options
            .create_if_missing(true)
            .busy_timeout(self.busy_timeout);

        Ok(if self.is_in_memory() {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        })
    }
}

impl From<&refcord_common::DatabaseConfig> for DatabaseConfig {
    fn from(config: &refcord_common::DatabaseConfig) -> Self {
        let base = Self::new(config.url.clone());
        if base.is_in_memory() {
            Self {
                url: base.url,
                ..Self::in_memory()
            }
        } else {
            Self {
                max_connections: config.max_connections.max(1),
                ..base
            }
        }
    }
}

/// Create a new SQLite connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect_with(config.connect_options()?)
        .await
}

/// Apply the ledger schema
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
