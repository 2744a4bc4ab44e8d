//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! to match production behavior and properly test migrations, constraints, and indexes.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use soul_core::types::*;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = soul_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        soul_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: Create a track with only a title
pub async fn create_test_track(pool: &SqlitePool, title: &str) -> Track {
    soul_storage::tracks::create(pool, CreateTrack::titled(title))
        .await
        .expect("Failed to create test track")
}

/// Test fixture: Create a track with artist and album
pub async fn create_full_track(pool: &SqlitePool, title: &str, artist: &str, album: &str) -> Track {
    soul_storage::tracks::create(
        pool,
        CreateTrack {
            title: title.to_string(),
            artist_name: Some(artist.to_string()),
            album_title: Some(album.to_string()),
            duration_seconds: Some(180.0),
            rating: 3,
        },
    )
    .await
    .expect("Failed to create test track")
}

/// Midnight UTC on the given date
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}
