//! Integration tests for the track store, views and cache
//!
//! Tests the query execution facility the selection engine relies on:
//! - Positional parameter binding and dynamic row decoding
//! - Full-record loading from composed queries
//! - View fragments against the real schema
//! - LRU track cache behavior

mod test_helpers;

use soul_core::{SqlValue, TrackCache, TrackStore, TrackView};
use soul_storage::{FilteredView, LibraryView, PlaylistView, SqliteTrackStore, StoreTrackCache};
use test_helpers::*;

fn select_from(store: &SqliteTrackStore, view: &dyn TrackView) -> String {
    let fragments = store.fragments();
    format!(
        "SELECT {} FROM {} {} WHERE ({}) AND ({}) ORDER BY {}",
        fragments.select,
        fragments.from,
        view.from_fragment(),
        fragments.condition_or_true(),
        view.condition_fragment().unwrap_or("1=1"),
        fragments.track_id_column,
    )
}

#[tokio::test]
async fn test_fetch_row_decodes_column_types() {
    let test_db = TestDb::new().await;
    let store = SqliteTrackStore::new(test_db.pool.clone());

    let row = store
        .fetch_row(
            "SELECT ?, ?, ?, NULL",
            &[SqlValue::from(7_i64), SqlValue::from(1.5), SqlValue::from("text")],
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        row,
        vec![
            SqlValue::Integer(7),
            SqlValue::Real(1.5),
            SqlValue::Text("text".to_string()),
            SqlValue::Null,
        ]
    );
}

#[tokio::test]
async fn test_fetch_i64_and_empty_results() {
    let test_db = TestDb::new().await;
    let store = SqliteTrackStore::new(test_db.pool.clone());

    assert_eq!(store.fetch_i64("SELECT COUNT(*) FROM tracks", &[]).await.unwrap(), Some(0));
    assert!(store
        .fetch_row("SELECT id FROM tracks WHERE id = ?", &[SqlValue::from(1_i64)])
        .await
        .unwrap()
        .is_none());
    assert!(store.fetch_rows("SELECT id FROM tracks", &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_execute_reports_affected_rows() {
    let test_db = TestDb::new().await;
    let store = SqliteTrackStore::new(test_db.pool.clone());
    create_test_track(&test_db.pool, "A").await;
    create_test_track(&test_db.pool, "B").await;

    let affected = store
        .execute("UPDATE tracks SET rating = ?", &[SqlValue::from(4)])
        .await
        .unwrap();
    assert_eq!(affected, 2);
}

#[tokio::test]
async fn test_fetch_track_loads_full_record() {
    let test_db = TestDb::new().await;
    let store = SqliteTrackStore::new(test_db.pool.clone());
    let created = create_full_track(&test_db.pool, "Song", "Artist", "Album").await;

    let sql = select_from(&store, &LibraryView);
    let track = store.fetch_track(&sql, &[]).await.unwrap().unwrap();

    assert_eq!(track, created);
}

#[tokio::test]
async fn test_invalid_sql_is_a_database_error() {
    let test_db = TestDb::new().await;
    let store = SqliteTrackStore::new(test_db.pool.clone());

    let result = store.fetch_rows("SELECT nope FROM nowhere", &[]).await;
    assert!(matches!(result, Err(soul_core::SoulError::Database(_))));
}

#[tokio::test]
async fn test_base_condition_hides_tracks() {
    let test_db = TestDb::new().await;
    let hidden = create_test_track(&test_db.pool, "Hidden").await;
    let visible = create_test_track(&test_db.pool, "Visible").await;

    let store = SqliteTrackStore::with_condition(
        test_db.pool.clone(),
        Some(format!("t.id <> {}", hidden.id)),
    );
    let sql = select_from(&store, &LibraryView);
    let rows = store.fetch_rows(&sql, &[]).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].as_i64(), Some(visible.id));
}

#[tokio::test]
async fn test_playlist_view_scopes_rows() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let store = SqliteTrackStore::new(pool.clone());

    let a = create_test_track(pool, "A").await;
    create_test_track(pool, "B").await;
    let c = create_test_track(pool, "C").await;

    let playlist = soul_storage::playlists::create(pool, "Mix").await.unwrap();
    soul_storage::playlists::add_track(pool, playlist, c.id).await.unwrap();
    soul_storage::playlists::add_track(pool, playlist, a.id).await.unwrap();
    soul_storage::playlists::add_track(pool, playlist, c.id).await.unwrap();

    assert_eq!(
        soul_storage::playlists::get_track_ids(pool, playlist).await.unwrap(),
        vec![c.id, a.id]
    );

    let sql = select_from(&store, &PlaylistView::new(playlist));
    let ids: Vec<_> = store
        .fetch_rows(&sql, &[])
        .await
        .unwrap()
        .iter()
        .filter_map(|row| row[0].as_i64())
        .collect();
    assert_eq!(ids, vec![a.id, c.id]);
}

#[tokio::test]
async fn test_filtered_view_uses_track_columns() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let store = SqliteTrackStore::new(pool.clone());

    create_full_track(pool, "Other", "Someone", "Else").await;
    let nina = create_full_track(pool, "Feeling Good", "Nina", "I Put a Spell").await;

    let view = FilteredView::new("nina", "ar.name = 'Nina'");
    let sql = select_from(&store, &view);
    let tracks = store.fetch_track(&sql, &[]).await.unwrap().unwrap();

    assert_eq!(tracks.id, nina.id);
}

#[tokio::test]
async fn test_playlist_name_is_required() {
    let test_db = TestDb::new().await;

    let result = soul_storage::playlists::create(test_db.pool(), " ").await;
    assert!(matches!(result, Err(soul_core::SoulError::InvalidInput(_))));
}

#[tokio::test]
async fn test_cache_loads_and_remembers() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let cache = StoreTrackCache::with_capacity(pool.clone(), 2);

    let a = create_test_track(pool, "A").await;
    let b = create_test_track(pool, "B").await;
    let c = create_test_track(pool, "C").await;

    assert_eq!(cache.materialize(a.id).await.unwrap().unwrap().title, "A");
    assert_eq!(cache.len().await, 1);

    cache.materialize(b.id).await.unwrap();
    cache.materialize(c.id).await.unwrap();
    assert_eq!(cache.len().await, 2);

    cache.clear().await;
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_cache_serves_stale_record_until_invalidated() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let cache = StoreTrackCache::new(pool.clone());
    let track = create_test_track(pool, "Song").await;

    cache.materialize(track.id).await.unwrap();
    soul_storage::tracks::set_stream_error(pool, track.id, 7).await.unwrap();

    let cached = cache.materialize(track.id).await.unwrap().unwrap();
    assert_eq!(cached.last_stream_error, 0);

    cache.invalidate(track.id).await;
    let fresh = cache.materialize(track.id).await.unwrap().unwrap();
    assert_eq!(fresh.last_stream_error, 7);
}

#[tokio::test]
async fn test_cache_miss_for_unknown_track() {
    let test_db = TestDb::new().await;
    let cache = StoreTrackCache::new(test_db.pool.clone());

    assert!(cache.materialize(12345).await.unwrap().is_none());
    assert_eq!(cache.len().await, 0);
}
