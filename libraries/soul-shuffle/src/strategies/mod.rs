//! Built-in strategies

mod random_by_track;

pub use random_by_track::RandomByTrack;
