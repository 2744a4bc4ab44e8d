//! Filtered views and their track caches
//!
//! A view is the user's current filter expressed as SQL fragments against
//! the `t` alias of the base track source.

use crate::tracks;
use async_trait::async_trait;
use lru::LruCache;
use soul_core::{error::Result, PlaylistId, Track, TrackCache, TrackId, TrackView};
use sqlx::SqlitePool;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// The whole collection, unfiltered
#[derive(Debug, Clone, Default)]
pub struct LibraryView;

impl TrackView for LibraryView {
    fn key(&self) -> &str {
        "library"
    }
}

/// Tracks that are members of one playlist
#[derive(Debug, Clone)]
pub struct PlaylistView {
    playlist_id: PlaylistId,
    key: String,
    condition: String,
}

impl PlaylistView {
    pub fn new(playlist_id: PlaylistId) -> Self {
        Self {
            playlist_id,
            key: format!("playlist:{playlist_id}"),
            condition: format!("pt.playlist_id = {playlist_id}"),
        }
    }

    pub fn playlist_id(&self) -> PlaylistId {
        self.playlist_id
    }
}

impl TrackView for PlaylistView {
    fn key(&self) -> &str {
        &self.key
    }

    fn from_fragment(&self) -> &str {
        "INNER JOIN playlist_tracks pt ON pt.track_id = t.id"
    }

    fn condition_fragment(&self) -> Option<&str> {
        Some(&self.condition)
    }
}

/// An arbitrary filter, e.g. a search box or a smart playlist
#[derive(Debug, Clone)]
pub struct FilteredView {
    key: String,
    from: String,
    condition: Option<String>,
}

impl FilteredView {
    pub fn new(key: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            from: String::new(),
            condition: Some(condition.into()),
        }
    }

    /// Add joins the condition depends on
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }
}

impl TrackView for FilteredView {
    fn key(&self) -> &str {
        &self.key
    }

    fn from_fragment(&self) -> &str {
        &self.from
    }

    fn condition_fragment(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Bounded LRU of full track records, loaded from the pool on miss
pub struct StoreTrackCache {
    pool: SqlitePool,
    entries: Mutex<LruCache<TrackId, Track>>,
}

impl StoreTrackCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_capacity(pool, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(pool: SqlitePool, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            pool,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Drop a cached record after the track changed in the store
    pub async fn invalidate(&self, track_id: TrackId) {
        self.entries.lock().await.pop(&track_id);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl TrackCache for StoreTrackCache {
    async fn materialize(&self, track_id: TrackId) -> Result<Option<Track>> {
        if let Some(track) = self.entries.lock().await.get(&track_id) {
            return Ok(Some(track.clone()));
        }

        let track = tracks::get_by_id(&self.pool, track_id).await?;
        if let Some(track) = &track {
            self.entries.lock().await.put(track_id, track.clone());
        }

        Ok(track)
    }
}
