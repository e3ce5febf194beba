use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Clone)]
pub struct DbPool(SqlitePool);

impl DbPool {
    pub async fn new(db_path: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Self(pool))
    }

    /// Single-connection in-memory database, so every query sees the same data
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self(pool))
    }

    pub fn inner(&self) -> &SqlitePool {
        &self.0
    }
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations");

    // released holds unix seconds
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS version (
            version TEXT NOT NULL,
            released INTEGER NOT NULL,
            build INTEGER NOT NULL,
            prerelease BOOLEAN NOT NULL,
            platform TEXT NOT NULL,
            architecture TEXT NOT NULL,
            installer BOOLEAN NOT NULL,
            link TEXT NOT NULL,
            PRIMARY KEY (version, build, platform, architecture)
        )
    "#).execute(pool.inner()).await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS version_released ON version (prerelease, released DESC)",
    )
    .execute(pool.inner())
    .await?;

    info!("Database migrations completed");
    Ok(())
}
