pub use pool::{run_migrations, DbPool};
pub use releases::{ReleaseRepository, LATEST_LIMIT};

mod pool;
mod releases;

pub type Database = DbPool;

pub async fn init_db(db_path: &str) -> Result<Database, sqlx::Error> {
    let db = Database::new(db_path).await?;

    run_migrations(&db).await?;

    Ok(db)
}
