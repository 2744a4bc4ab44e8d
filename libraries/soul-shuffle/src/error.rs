//! Error types for shuffle selection

use soul_core::{SoulError, TrackId};
use thiserror::Error;

/// Shuffle selection errors
///
/// "No candidate" is not an error: selection returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum ShuffleError {
    /// A second context was bound to a strategy (configuration bug)
    #[error("strategy `{strategy}` is already bound to context `{context}`")]
    AlreadyBound { strategy: String, context: String },

    /// Selection attempted before `bind_context`
    #[error("strategy `{0}` has no shuffle context bound")]
    ContextNotBound(String),

    /// Selection attempted before `bind_view`
    #[error("strategy `{0}` has no track view bound")]
    ViewNotBound(String),

    /// The candidate row was found but its full record could not be loaded
    #[error("failed to materialize track {track_id}: {source}")]
    Materialize {
        track_id: TrackId,
        #[source]
        source: SoulError,
    },

    /// Context names must be non-empty
    #[error("invalid context name: {0:?}")]
    InvalidContextName(String),

    /// Query execution failed in the store
    #[error(transparent)]
    Storage(#[from] SoulError),
}

impl ShuffleError {
    /// Whether this is a per-track failure a driver may skip over
    ///
    /// Everything else is either a configuration bug or a store failure.
    pub fn is_per_track(&self) -> bool {
        matches!(self, Self::Materialize { .. })
    }
}

/// Result type for shuffle operations
pub type Result<T> = std::result::Result<T, ShuffleError>;
