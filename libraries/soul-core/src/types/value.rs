//! Positional query parameters and loosely typed result values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single positional parameter or result column
///
/// Timestamps travel as unix seconds, matching how the store persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// Integers, booleans and timestamps
    Integer(i64),
    /// Floating point
    Real(f64),
    /// Text
    Text(String),
}

impl SqlValue {
    /// Integer content, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Text content, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Interpret an integer column as unix seconds
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        self.as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Whether this is SQL `NULL`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Integer(value.timestamp())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
