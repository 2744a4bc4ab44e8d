mod fragments;
mod ids;
mod track;
mod value;

pub use fragments::ProviderFragments;
pub use ids::{ContextId, PlaylistId, TrackId};
pub use track::{CreateTrack, Track};
pub use value::SqlValue;
