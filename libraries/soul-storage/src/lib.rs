//! Soul Storage
//!
//! `SQLite` implementation of the collaborators the shuffle engine consumes:
//! the track store with its query execution facility, filtered views, and
//! track caches.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature (`tracks`, `playlists`, `views`) owns
//!   its own queries and logic
//! - **Fragments, not queries**: Views only publish SQL fragments; the
//!   selection engine composes and `SqliteTrackStore` executes
//!
//! # Example
//!
//! ```rust,no_run
//! use soul_storage::{create_pool, run_migrations, SqliteTrackStore};
//! use soul_core::TrackStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://soul.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteTrackStore::new(pool);
//! let newest = store
//!     .fetch_i64("SELECT MAX(id) FROM tracks", &[])
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

// Vertical slices
pub mod playlists;
pub mod tracks;
pub mod views;

pub use error::StorageError;
pub use sqlx::sqlite::SqlitePool;
pub use store::SqliteTrackStore;
pub use views::{FilteredView, LibraryView, PlaylistView, StoreTrackCache};

use sqlx::migrate::Migrator;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before any view or store is handed to the
/// selection engine.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::debug!(migrations = MIGRATOR.iter().count(), "migrations applied");
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://soul.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "creating sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("sqlite pool ready");

    Ok(pool)
}
