use crate::{tracks, StorageError};
use async_trait::async_trait;
use soul_core::{error::Result, ProviderFragments, SqlValue, Track, TrackStore};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, TypeInfo, ValueRef};

/// `SQLite`-backed track store
///
/// Executes composed query text with positional parameters. Full records are
/// loaded from the leading `TRACK_COLUMNS` of each row.
#[derive(Clone)]
pub struct SqliteTrackStore {
    pool: SqlitePool,
    fragments: ProviderFragments,
}

impl SqliteTrackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_condition(pool, None)
    }

    /// Store whose base filter hides some tracks from every query
    pub fn with_condition(pool: SqlitePool, condition: Option<String>) -> Self {
        Self {
            pool,
            fragments: ProviderFragments {
                select: tracks::TRACK_COLUMNS.to_string(),
                from: tracks::TRACK_SOURCE.to_string(),
                condition,
                track_id_column: "t.id".to_string(),
            },
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind_all<'q>(sql: &'q str, params: &'q [SqlValue]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(value) => query.bind(*value),
            SqlValue::Real(value) => query.bind(*value),
            SqlValue::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

fn row_values(row: &SqliteRow) -> std::result::Result<Vec<SqlValue>, StorageError> {
    (0..row.len())
        .map(|index| {
            let (is_null, type_name) = {
                let raw = row.try_get_raw(index)?;
                (raw.is_null(), raw.type_info().name().to_string())
            };
            if is_null {
                return Ok(SqlValue::Null);
            }
            match type_name.as_str() {
                "INTEGER" => Ok(SqlValue::Integer(row.try_get(index)?)),
                "REAL" => Ok(SqlValue::Real(row.try_get(index)?)),
                "TEXT" => Ok(SqlValue::Text(row.try_get(index)?)),
                other => Err(StorageError::malformed(
                    format!("#{index}"),
                    format!("unsupported column type {other}"),
                )),
            }
        })
        .collect()
}

#[async_trait]
impl TrackStore for SqliteTrackStore {
    fn fragments(&self) -> &ProviderFragments {
        &self.fragments
    }

    async fn fetch_track(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Track>> {
        tracing::trace!(sql, params = params.len(), "fetch_track");
        let row = bind_all(sql, params).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => Ok(Some(tracks::from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_row(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Vec<SqlValue>>> {
        tracing::trace!(sql, params = params.len(), "fetch_row");
        let row = bind_all(sql, params).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => Ok(Some(row_values(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Vec<SqlValue>>> {
        tracing::trace!(sql, params = params.len(), "fetch_rows");
        let rows = bind_all(sql, params).fetch_all(&self.pool).await?;

        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            values.push(row_values(row)?);
        }
        Ok(values)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        tracing::trace!(sql, params = params.len(), "execute");
        let result = bind_all(sql, params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
