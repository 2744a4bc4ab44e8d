//! Soul Shuffle Core
//!
//! Storage-agnostic types, traits, and error handling shared by the shuffle
//! selection engine and its storage backends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `CreateTrack`, id aliases
//! - **Query Plumbing**: `SqlValue` parameters and the store provider's
//!   `ProviderFragments`
//! - **Collaborator Traits**: `TrackStore`, `TrackView`, `TrackCache`
//! - **Error Handling**: Unified `SoulError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use soul_core::types::{SqlValue, Track};
//! use chrono::{TimeZone, Utc};
//!
//! let track = Track::new(1, "My Favorite Song");
//! assert!(!track.has_stream_error());
//!
//! let after = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! assert_eq!(SqlValue::from(after), SqlValue::Integer(after.timestamp()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SoulError};
pub use storage::TrackStore;
pub use traits::{TrackCache, TrackView};

pub use types::{
    ContextId, CreateTrack, PlaylistId, ProviderFragments, SqlValue, Track, TrackId,
};
