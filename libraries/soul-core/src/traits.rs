/// Collaborator traits for filtered track views
use crate::error::Result;
use crate::types::{Track, TrackId};
use async_trait::async_trait;

/// A filtered view over the track store
///
/// Views describe the user's current filter as query fragments. They never
/// execute anything themselves.
pub trait TrackView: Send + Sync {
    /// Stable identity of the view
    ///
    /// Two views with the same key are considered the same view; rebinding
    /// to an equal key does not reset strategy state.
    fn key(&self) -> &str;

    /// Extra source fragment appended after the provider's base source
    /// (typically joins), empty when the view needs none
    fn from_fragment(&self) -> &str {
        ""
    }

    /// Filter fragment, `None` when the view shows the whole collection
    fn condition_fragment(&self) -> Option<&str> {
        None
    }
}

/// Materializes full track records from raw identifiers
///
/// Backed by whatever the view keeps warm, so that playback selection does
/// not pay for a full-record query on every pick.
#[async_trait]
pub trait TrackCache: Send + Sync {
    /// Load the full record for `track_id`, `None` if it vanished
    async fn materialize(&self, track_id: TrackId) -> Result<Option<Track>>;
}
