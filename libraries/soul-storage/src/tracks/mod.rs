//! Tracks vertical slice
//!
//! CRUD for library tracks plus the play/skip/stream-error stamps the
//! anti-repeat rules read.

use crate::StorageError;
use chrono::{DateTime, Utc};
use soul_core::{error::Result, types::*, SoulError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Columns every full-record load starts with
pub(crate) const TRACK_COLUMNS: &str = "t.id, t.title, ar.name AS artist_name, \
     al.title AS album_title, t.duration_seconds, t.rating, t.play_count, \
     t.skip_count, t.last_played_at, t.last_skipped_at, t.last_stream_error, t.created_at";

/// Source the track columns are read from
pub(crate) const TRACK_SOURCE: &str = "tracks t \
     LEFT JOIN artists ar ON ar.id = t.artist_id \
     LEFT JOIN albums al ON al.id = t.album_id";

/// Load a `Track` from a row whose columns include `TRACK_COLUMNS`
pub(crate) fn from_row(row: &SqliteRow) -> std::result::Result<Track, StorageError> {
    let created_at = timestamp(row, "created_at")?
        .ok_or_else(|| StorageError::malformed("created_at", "is null"))?;

    Ok(Track {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        artist_name: row.try_get("artist_name")?,
        album_title: row.try_get("album_title")?,
        duration_seconds: row.try_get("duration_seconds")?,
        rating: row.try_get("rating")?,
        play_count: row.try_get("play_count")?,
        skip_count: row.try_get("skip_count")?,
        last_played_at: timestamp(row, "last_played_at")?,
        last_skipped_at: timestamp(row, "last_skipped_at")?,
        last_stream_error: row.try_get("last_stream_error")?,
        created_at,
    })
}

fn timestamp(
    row: &SqliteRow,
    column: &str,
) -> std::result::Result<Option<DateTime<Utc>>, StorageError> {
    let secs: Option<i64> = row.try_get(column)?;
    secs.map(|secs| {
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| StorageError::malformed(column, format!("{secs} is out of range")))
    })
    .transpose()
}

/// Get track by ID
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let sql = format!("SELECT {TRACK_COLUMNS} FROM {TRACK_SOURCE} WHERE t.id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    match row {
        Some(row) => Ok(Some(from_row(&row)?)),
        None => Ok(None),
    }
}

/// Get all tracks ordered by id
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let sql = format!("SELECT {TRACK_COLUMNS} FROM {TRACK_SOURCE} ORDER BY t.id");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter()
        .map(|row| from_row(row).map_err(SoulError::from))
        .collect()
}

/// Create a track, creating its artist and album on first sight
pub async fn create(pool: &SqlitePool, track: CreateTrack) -> Result<Track> {
    if track.title.trim().is_empty() {
        return Err(SoulError::invalid_input("track title must not be empty"));
    }
    if !(0..=5).contains(&track.rating) {
        return Err(SoulError::invalid_input(format!(
            "rating {} is outside 0..=5",
            track.rating
        )));
    }

    let mut tx = pool.begin().await?;

    let artist_id = match track.artist_name.as_deref() {
        Some(name) => Some(ensure_named(&mut tx, "artists", "name", name).await?),
        None => None,
    };
    let album_id = match track.album_title.as_deref() {
        Some(title) => Some(ensure_named(&mut tx, "albums", "title", title).await?),
        None => None,
    };

    let id = sqlx::query(
        "INSERT INTO tracks (title, artist_id, album_id, duration_seconds, rating, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&track.title)
    .bind(artist_id)
    .bind(album_id)
    .bind(track.duration_seconds)
    .bind(track.rating)
    .bind(Utc::now().timestamp())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;

    get_by_id(pool, id)
        .await?
        .ok_or(SoulError::TrackNotFound(id))
}

/// Insert-or-lookup a row in a `(id, <column> UNIQUE)` table
async fn ensure_named(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    value: &str,
) -> Result<i64> {
    let insert = format!("INSERT INTO {table} ({column}) VALUES (?) ON CONFLICT({column}) DO NOTHING");
    sqlx::query(&insert).bind(value).execute(&mut *conn).await?;

    let select = format!("SELECT id FROM {table} WHERE {column} = ?");
    let id: i64 = sqlx::query_scalar(&select)
        .bind(value)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

/// Record a completed play at `at`
pub async fn record_play(pool: &SqlitePool, id: TrackId, at: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tracks SET play_count = play_count + 1, last_played_at = ? WHERE id = ?",
    )
    .bind(at.timestamp())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SoulError::TrackNotFound(id));
    }

    Ok(())
}

/// Record a skip at `at`
pub async fn record_skip(pool: &SqlitePool, id: TrackId, at: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tracks SET skip_count = skip_count + 1, last_skipped_at = ? WHERE id = ?",
    )
    .bind(at.timestamp())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SoulError::TrackNotFound(id));
    }

    Ok(())
}

/// Set (or clear, with `0`) the last stream error code
pub async fn set_stream_error(pool: &SqlitePool, id: TrackId, code: i32) -> Result<()> {
    let result = sqlx::query("UPDATE tracks SET last_stream_error = ? WHERE id = ?")
        .bind(code)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(SoulError::TrackNotFound(id));
    }

    Ok(())
}

/// Delete a track
pub async fn delete(pool: &SqlitePool, id: TrackId) -> Result<()> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(SoulError::TrackNotFound(id));
    }

    Ok(())
}
