//! Playlists vertical slice
//!
//! Just enough to scope a `PlaylistView`: create a playlist, append tracks,
//! list membership.

use chrono::Utc;
use soul_core::{error::Result, types::*, SoulError};
use sqlx::SqlitePool;

/// Create an empty playlist, returning its id
pub async fn create(pool: &SqlitePool, name: &str) -> Result<PlaylistId> {
    if name.trim().is_empty() {
        return Err(SoulError::invalid_input("playlist name must not be empty"));
    }

    let id = sqlx::query("INSERT INTO playlists (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(id)
}

/// Append a track to the end of a playlist
///
/// Adding a track that is already a member is a no-op.
pub async fn add_track(pool: &SqlitePool, playlist_id: PlaylistId, track_id: TrackId) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlist_tracks (playlist_id, track_id, position)
        VALUES (
            ?, ?,
            (SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_tracks WHERE playlist_id = ?)
        )
        ON CONFLICT(playlist_id, track_id) DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(track_id)
    .bind(playlist_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Track ids in playlist order
pub async fn get_track_ids(pool: &SqlitePool, playlist_id: PlaylistId) -> Result<Vec<TrackId>> {
    let ids = sqlx::query_scalar(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
