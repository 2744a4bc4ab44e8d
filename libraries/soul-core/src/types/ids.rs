//! ID types for Soul entities
//!
//! All persisted entities use `SQLite` integer row ids.

/// Track identifier (`tracks.id`)
pub type TrackId = i64;

/// Shuffle context identifier (`shufflers.id`)
pub type ContextId = i64;

/// Playlist identifier (`playlists.id`)
pub type PlaylistId = i64;
