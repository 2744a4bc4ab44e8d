/// Track domain type
use super::ids::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A track as seen by the selection engine
///
/// Only the columns the anti-repeat rules and the auto-DJ driver need are
/// carried here; richer metadata stays in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name (denormalized)
    pub artist_name: Option<String>,

    /// Album title (denormalized)
    pub album_title: Option<String>,

    /// Track duration in seconds
    pub duration_seconds: Option<f64>,

    /// User rating, 0 (unrated) to 5
    pub rating: i32,

    /// Number of completed plays
    pub play_count: i32,

    /// Number of skips
    pub skip_count: i32,

    /// When the track was last played
    pub last_played_at: Option<DateTime<Utc>>,

    /// When the track was last skipped
    pub last_skipped_at: Option<DateTime<Utc>>,

    /// Last stream error code, 0 when the last attempt succeeded
    pub last_stream_error: i32,

    /// When the track was added to the library
    pub created_at: DateTime<Utc>,
}

impl Track {
    /// Create a track with minimal metadata
    pub fn new(id: TrackId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist_name: None,
            album_title: None,
            duration_seconds: None,
            rating: 0,
            play_count: 0,
            skip_count: 0,
            last_played_at: None,
            last_skipped_at: None,
            last_stream_error: 0,
            created_at: Utc::now(),
        }
    }

    /// Whether the last attempt to stream this track failed
    pub fn has_stream_error(&self) -> bool {
        self.last_stream_error != 0
    }

    /// Whether the track passes the played/skipped recency rules for `after`
    ///
    /// A track is fresh when it has no stream error and neither its last play
    /// nor its last skip happened at or after `after`.
    pub fn is_fresh(&self, after: DateTime<Utc>) -> bool {
        !self.has_stream_error()
            && self.last_played_at.map_or(true, |at| at < after)
            && self.last_skipped_at.map_or(true, |at| at < after)
    }
}

/// Data for creating a new track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    pub artist_name: Option<String>,
    pub album_title: Option<String>,
    pub duration_seconds: Option<f64>,
    pub rating: i32,
}

impl CreateTrack {
    /// Minimal track input with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}
