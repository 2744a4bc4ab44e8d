/// Common test utilities and fixtures
use soul_shuffle::ContextRegistry;
use soul_storage::SqliteTrackStore;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

/// Migrated database in a temp dir, with its context registry
pub struct TestDb {
    pub pool: SqlitePool,
    pub registry: ContextRegistry,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("autodj.db").display());

        let pool = soul_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");
        soul_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let registry = ContextRegistry::open(Arc::new(SqliteTrackStore::new(pool.clone())))
            .await
            .expect("Failed to open registry");

        Self {
            pool,
            registry,
            _temp_dir: temp_dir,
        }
    }
}
