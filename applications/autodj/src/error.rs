/// Auto-DJ error types
use soul_shuffle::ShuffleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutodjError>;

#[derive(Debug, Error)]
pub enum AutodjError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Selection error: {0}")]
    Shuffle(#[from] ShuffleError),

    #[error("Database error: {0}")]
    Database(#[from] soul_core::SoulError),
}

impl From<soul_storage::StorageError> for AutodjError {
    fn from(err: soul_storage::StorageError) -> Self {
        AutodjError::Database(err.into())
    }
}

impl From<config::ConfigError> for AutodjError {
    fn from(err: config::ConfigError) -> Self {
        AutodjError::Config(err.to_string())
    }
}
