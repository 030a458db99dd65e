//! SQLite database connection and migration management.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use super::{
    SqliteApiKeyRepository, SqliteFamilyRepository, SqliteMemberRepository,
    SqliteScheduleRepository, SqliteSharedListRepository, SqliteSubscriptionRepository,
    SqliteTaskRepository,
};
use crate::db::{Database, DbError, DbResult};

/// SQLite database implementation.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if needed) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Every pooled connection to `:memory:` would see its own empty
    /// database, so the pool is pinned to a single connection that never
    /// expires.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Access the underlying pool (tests and advanced operations).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Database for SqliteDatabase {
    type Families<'a> = SqliteFamilyRepository<'a>;
    type Members<'a> = SqliteMemberRepository<'a>;
    type Schedules<'a> = SqliteScheduleRepository<'a>;
    type Subscriptions<'a> = SqliteSubscriptionRepository<'a>;
    type Tasks<'a> = SqliteTaskRepository<'a>;
    type SharedLists<'a> = SqliteSharedListRepository<'a>;
    type ApiKeys<'a> = SqliteApiKeyRepository<'a>;

    async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!("./data/sql/sqlite").run(&self.pool).await?;
        Ok(())
    }

    fn families(&self) -> Self::Families<'_> {
        SqliteFamilyRepository { pool: &self.pool }
    }

    fn members(&self) -> Self::Members<'_> {
        SqliteMemberRepository { pool: &self.pool }
    }

    fn schedules(&self) -> Self::Schedules<'_> {
        SqliteScheduleRepository { pool: &self.pool }
    }

    fn subscriptions(&self) -> Self::Subscriptions<'_> {
        SqliteSubscriptionRepository { pool: &self.pool }
    }

    fn tasks(&self) -> Self::Tasks<'_> {
        SqliteTaskRepository { pool: &self.pool }
    }

    fn shared_lists(&self) -> Self::SharedLists<'_> {
        SqliteSharedListRepository { pool: &self.pool }
    }

    fn api_keys(&self) -> Self::ApiKeys<'_> {
        SqliteApiKeyRepository { pool: &self.pool }
    }
}
