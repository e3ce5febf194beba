use crate::models::{Channel, Release, ReleaseKey};
use chrono::DateTime;
use sqlx::SqlitePool;
use tracing::info;

/// Number of records returned per channel by the `/latest/<channel>` endpoints
pub const LATEST_LIMIT: i64 = 10;

pub struct ReleaseRepository {
    pool: SqlitePool,
}

impl ReleaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check whether a release with this exact key tuple is stored.
    /// Handlers rely on `insert`/`delete` reporting conflicts themselves.
    #[cfg(test)]
    pub async fn exists(&self, key: &ReleaseKey) -> Result<bool, sqlx::Error> {
        let (exists,): (i64,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM version
                 WHERE version = ? AND build = ? AND platform = ? AND architecture = ?
             )",
        )
        .bind(&key.version)
        .bind(build_column(key.build)?)
        .bind(&key.platform)
        .bind(&key.architecture)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    /// Insert a release unless its key tuple is already taken.
    ///
    /// Returns `false` when a record with the same key exists. The check and the
    /// write are a single statement, so concurrent inserts of one key cannot both
    /// succeed.
    pub async fn insert(&self, release: &Release) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO version (version, released, build, prerelease, platform, architecture, installer, link)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (version, build, platform, architecture) DO NOTHING",
        )
        .bind(&release.version)
        .bind(release.released.timestamp())
        .bind(build_column(release.build)?)
        .bind(release.prerelease)
        .bind(&release.platform)
        .bind(&release.architecture)
        .bind(release.installer)
        .bind(&release.link)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!("Added release {}", release.key());
        }
        Ok(inserted)
    }

    /// Delete a release, returning whether a record was removed
    pub async fn delete(&self, key: &ReleaseKey) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM version WHERE version = ? AND build = ? AND platform = ? AND architecture = ?",
        )
        .bind(&key.version)
        .bind(build_column(key.build)?)
        .bind(&key.platform)
        .bind(&key.architecture)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Removed release {}", key);
        }
        Ok(deleted)
    }

    /// Most recently released record across both channels
    pub async fn latest(&self) -> Result<Option<Release>, sqlx::Error> {
        let row = sqlx::query_as::<_, ReleaseRow>(
            "SELECT version, released, build, prerelease, platform, architecture, installer, link
             FROM version
             ORDER BY released DESC, build DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_release()))
    }

    /// Most recent `limit` records of one channel, newest first
    pub async fn latest_by_channel(
        &self,
        channel: Channel,
        limit: i64,
    ) -> Result<Vec<Release>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ReleaseRow>(
            "SELECT version, released, build, prerelease, platform, architecture, installer, link
             FROM version
             WHERE prerelease = ?
             ORDER BY released DESC, build DESC
             LIMIT ?",
        )
        .bind(channel.is_prerelease())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_release()).collect())
    }

    /// Total number of stored releases
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM version")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// SQLite integers are signed; builds above i64::MAX cannot be stored
fn build_column(build: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(build).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Raw database row for releases
#[derive(sqlx::FromRow)]
struct ReleaseRow {
    version: String,
    released: i64,
    build: i64,
    prerelease: bool,
    platform: String,
    architecture: String,
    installer: bool,
    link: String,
}

impl ReleaseRow {
    fn into_release(self) -> Release {
        Release {
            version: self.version,
            released: DateTime::from_timestamp(self.released, 0).unwrap_or_default(),
            build: u64::try_from(self.build).unwrap_or_default(),
            prerelease: self.prerelease,
            platform: self.platform,
            architecture: self.architecture,
            installer: self.installer,
            link: self.link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use chrono::{TimeZone, Utc};

    async fn create_test_repo() -> ReleaseRepository {
        let db = DbPool::in_memory().await.unwrap();
        crate::db::run_migrations(&db).await.unwrap();
        ReleaseRepository::new(db.inner().clone())
    }

    fn release(version: &str, released: i64, build: u64, prerelease: bool) -> Release {
        Release {
            version: version.to_string(),
            released: Utc.timestamp_opt(released, 0).unwrap(),
            build,
            prerelease,
            platform: "windows".to_string(),
            architecture: "x64".to_string(),
            installer: false,
            link: format!("http://example.com/loop-{}.exe", version),
        }
    }

    #[tokio::test]
    async fn test_insert_then_exists() {
        let repo = create_test_repo().await;
        let r = release("1.0.0", 1637702533, 1, false);

        assert!(!repo.exists(&r.key()).await.unwrap());
        assert!(repo.insert(&r).await.unwrap());
        assert!(repo.exists(&r.key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_duplicate_key_is_rejected() {
        let repo = create_test_repo().await;
        let first = release("1.0.0", 1637702533, 1, false);
        let mut second = release("1.0.0", 1637800000, 1, true);
        second.link = "http://example.com/other.exe".to_string();

        assert!(repo.insert(&first).await.unwrap());
        assert!(!repo.insert(&second).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);

        let stored = repo.latest().await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_key_fields_are_all_significant() {
        let repo = create_test_repo().await;
        let base = release("1.0.0", 1637702533, 1, false);

        let mut other_arch = base.clone();
        other_arch.architecture = "arm64".to_string();
        let mut other_platform = base.clone();
        other_platform.platform = "macos".to_string();
        let other_build = release("1.0.0", 1637702533, 2, false);

        assert!(repo.insert(&base).await.unwrap());
        assert!(repo.insert(&other_arch).await.unwrap());
        assert!(repo.insert(&other_platform).await.unwrap());
        assert!(repo.insert(&other_build).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = create_test_repo().await;
        let r = release("1.0.0", 1637702533, 1, false);
        repo.insert(&r).await.unwrap();

        assert!(repo.delete(&r.key()).await.unwrap());
        assert!(!repo.exists(&r.key()).await.unwrap());
        assert!(!repo.delete(&r.key()).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_latest_empty() {
        let repo = create_test_repo().await;
        assert!(repo.latest().await.unwrap().is_none());
        assert!(repo
            .latest_by_channel(Channel::Stable, LATEST_LIMIT)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_latest_spans_channels() {
        let repo = create_test_repo().await;
        repo.insert(&release("1.0.0", 1000, 1, false)).await.unwrap();
        repo.insert(&release("1.1.0-beta", 3000, 2, true)).await.unwrap();
        repo.insert(&release("1.0.1", 2000, 3, false)).await.unwrap();

        let latest = repo.latest().await.unwrap().unwrap();
        assert_eq!(latest.version, "1.1.0-beta");
        assert!(latest.prerelease);
    }

    #[tokio::test]
    async fn test_latest_by_channel_filters_and_orders() {
        let repo = create_test_repo().await;
        repo.insert(&release("1.0.0", 1000, 1, false)).await.unwrap();
        repo.insert(&release("1.1.0-beta", 3000, 2, true)).await.unwrap();
        repo.insert(&release("1.0.1", 2000, 3, false)).await.unwrap();

        let stable = repo
            .latest_by_channel(Channel::Stable, LATEST_LIMIT)
            .await
            .unwrap();
        let versions: Vec<_> = stable.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.0.1", "1.0.0"]);

        let prerelease = repo
            .latest_by_channel(Channel::Prerelease, LATEST_LIMIT)
            .await
            .unwrap();
        assert_eq!(prerelease.len(), 1);
        assert!(prerelease.iter().all(|r| r.prerelease));
    }

    #[tokio::test]
    async fn test_latest_by_channel_respects_limit() {
        let repo = create_test_repo().await;
        for i in 0..15u64 {
            let r = release(&format!("1.0.{}", i), 1000 + i as i64, i, false);
            repo.insert(&r).await.unwrap();
        }

        let stable = repo
            .latest_by_channel(Channel::Stable, LATEST_LIMIT)
            .await
            .unwrap();
        assert_eq!(stable.len(), 10);
        assert_eq!(stable[0].version, "1.0.14");
        assert_eq!(stable[9].version, "1.0.5");
    }

    #[tokio::test]
    async fn test_build_out_of_range() {
        let repo = create_test_repo().await;
        let r = release("1.0.0", 1000, u64::MAX, false);
        assert!(repo.insert(&r).await.is_err());
    }
}
