/// Storage-specific errors
use thiserror::Error;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// A column held a value of the wrong shape
    #[error("Column `{column}` is malformed: {reason}")]
    MalformedColumn { column: String, reason: String },

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a malformed column error
    pub fn malformed(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for soul_core::SoulError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MalformedColumn { .. } => {
                soul_core::SoulError::malformed_row(err.to_string())
            }
            StorageError::Database(_) => soul_core::SoulError::storage(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soul_core::SoulError;

    #[test]
    fn malformed_column_becomes_malformed_row() {
        let err: SoulError = StorageError::malformed("created_at", "is null").into();
        assert!(matches!(err, SoulError::MalformedRow(ref msg) if msg.contains("created_at")));
    }

    #[test]
    fn database_failure_becomes_storage_error() {
        let err: SoulError = StorageError::from(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, SoulError::Storage(_)));
    }
}
