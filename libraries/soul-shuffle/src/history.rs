//! Shuffle history schema
//!
//! The selection engine owns three tables in the shared store:
//!
//! - `shufflers`: one row per shuffle context, stable name to integer id
//! - `shuffles`: last time each context chose each track
//! - `shuffle_modifications`: last manual insert/discard per context and track

use soul_core::{error::Result, TrackStore};

pub(crate) const CONTEXT_TABLE: &str = "shufflers";
pub(crate) const HISTORY_TABLE: &str = "shuffles";
pub(crate) const MODIFICATION_TABLE: &str = "shuffle_modifications";
pub(crate) const LAST_SHUFFLED_AT: &str = "last_shuffled_at";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS shufflers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS shuffles (
        shuffler_id INTEGER NOT NULL REFERENCES shufflers(id) ON DELETE CASCADE,
        track_id INTEGER NOT NULL,
        last_shuffled_at INTEGER NOT NULL,
        CONSTRAINT one_entry_per_track UNIQUE (shuffler_id, track_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_shuffles
        ON shuffles (shuffler_id, track_id, last_shuffled_at)",
    "CREATE TABLE IF NOT EXISTS shuffle_modifications (
        shuffler_id INTEGER NOT NULL REFERENCES shufflers(id) ON DELETE CASCADE,
        track_id INTEGER NOT NULL,
        last_modified_at INTEGER NOT NULL,
        modification_type INTEGER NOT NULL,
        CONSTRAINT one_modification_per_track UNIQUE (shuffler_id, track_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_shuffle_modifications
        ON shuffle_modifications (shuffler_id, track_id, last_modified_at, modification_type)",
];

/// Create the history tables if they do not exist yet
///
/// Idempotent; safe to run on every startup.
pub async fn install(store: &dyn TrackStore) -> Result<()> {
    for statement in SCHEMA {
        store.execute(statement, &[]).await?;
    }
    tracing::debug!("shuffle history schema installed");
    Ok(())
}
