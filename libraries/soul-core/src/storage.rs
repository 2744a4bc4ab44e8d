//! Track store trait
//!
//! The selection engine never talks to a database directly. It composes
//! query text plus positional parameters and hands them to a `TrackStore`,
//! which executes them and interprets at most the rows it is asked for.

use crate::error::Result;
use crate::types::{ProviderFragments, SqlValue, Track};
use async_trait::async_trait;

/// Query execution facility over the persisted track store
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Base projection/source/filter every candidate query starts from
    fn fragments(&self) -> &ProviderFragments;

    /// Run `sql` and load the first row as a full `Track`
    ///
    /// The leading columns of the row must be the provider's `select`
    /// projection. Returns `Ok(None)` when the query yields no rows.
    async fn fetch_track(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Track>>;

    /// Run `sql` and return the first row's columns, if any
    async fn fetch_row(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Vec<SqlValue>>>;

    /// Run `sql` and return every row's columns
    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Vec<SqlValue>>>;

    /// Execute a statement, returning the number of rows affected
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Convenience: first column of the first row as an integer
    async fn fetch_i64(&self, sql: &str, params: &[SqlValue]) -> Result<Option<i64>> {
        Ok(self
            .fetch_row(sql, params)
            .await?
            .and_then(|row| row.into_iter().next())
            .and_then(|value| value.as_i64()))
    }
}
