//! Soul Shuffle - Non-repeating track selection
//!
//! Picks the next track to play for two kinds of consumers:
//!
//! - the **Playback** context: the interactive queue, which respects the
//!   user's current view filter and never records history
//! - any number of **auto-DJ** contexts: autonomous shufflers that draw from
//!   the whole collection and record every pick so they avoid repeating it
//!
//! # Architecture
//!
//! - [`RandomBy`]: capability interface of one "kind of randomness"
//! - [`SelectionStrategy`]: binds a `RandomBy` to one [`ShuffleContext`]
//!   (write-once) and one `TrackView` (rebindable), and routes selection
//! - [`CandidateQueryBuilder`]: composes and caches the candidate query from
//!   the store, view, strategy and anti-repeat fragments
//! - [`ContextRegistry`]: one `ShuffleContext` per stable name, plus the
//!   distinguished Playback context
//!
//! `soul-shuffle` does not depend on a database. Storage backends implement
//! `soul_core::TrackStore`, `TrackView` and `TrackCache`.
//!
//! # Example
//!
//! ```rust,no_run
//! use soul_shuffle::{ContextRegistry, RandomByTrack};
//! use soul_core::{TrackCache, TrackStore, TrackView};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     store: Arc<dyn TrackStore>,
//! #     view: Arc<dyn TrackView>,
//! #     cache: Arc<dyn TrackCache>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ContextRegistry::open(store).await?;
//!
//! let strategy = registry.strategy(RandomByTrack::new());
//! strategy.bind_context(registry.context("autodj-1").await?).await?;
//! strategy.bind_view(view, cache).await?;
//!
//! let after = chrono::Utc::now() - chrono::Duration::hours(4);
//! if let Some(track) = strategy.get_track(after).await? {
//!     println!("next up: {}", track.title);
//! }
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod history;
mod query;
mod registry;
mod strategy;
pub mod strategies;

// Public exports
pub use context::{ModificationKind, ShuffleContext};
pub use error::{Result, ShuffleError};
pub use history::install as install_schema;
pub use query::{
    compose, record_query, CandidateQuery, CandidateQueryBuilder, QueryScope, QueryTag,
    StrategyFragments, RANDOM_CONDITION,
};
pub use registry::{ContextRegistry, ContextSummary, PLAYBACK_CONTEXT_NAME};
pub use strategies::RandomByTrack;
pub use strategy::{ContextBinding, RandomBy, SelectionStrategy, Selector, StrategyDescriptor};
