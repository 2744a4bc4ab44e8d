//! Soul Auto-DJ Library
//!
//! Autonomous track picker on top of `soul-shuffle`: every pick is recorded
//! in the named context's history so the same track is not chosen again
//! within the lookback window.
//!
//! This library exposes the driver and configuration for testing purposes.

pub mod config;
pub mod driver;
pub mod error;

// Re-export commonly used types for convenience
pub use config::AutodjConfig;
pub use driver::{AutoDj, PickReport, Round};
pub use error::{AutodjError, Result};
