//! Shuffle contexts
//!
//! A shuffle context is the consumer a selection is made for: the
//! interactive playback queue, or one of any number of independent auto-DJ
//! instances. Each context is the only writer of its own history rows.

use crate::error::Result;
use crate::history::{HISTORY_TABLE, MODIFICATION_TABLE};
use chrono::{DateTime, Utc};
use soul_core::{ContextId, SqlValue, Track, TrackId, TrackStore};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Manual edits a context makes to its own upcoming tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationKind {
    /// The user added the track by hand
    Insertion,
    /// The user removed the track before it played
    Discard,
}

impl ModificationKind {
    fn code(self) -> i64 {
        match self {
            ModificationKind::Insertion => 1,
            ModificationKind::Discard => -1,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ModificationKind::Insertion),
            -1 => Some(ModificationKind::Discard),
            _ => None,
        }
    }
}

/// One consumer of track selections and owner of its shuffle history
pub struct ShuffleContext {
    id: ContextId,
    name: String,
    store: Arc<dyn TrackStore>,
    // Serializes this context's own history writes
    writes: Mutex<()>,
}

impl fmt::Debug for ShuffleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShuffleContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ShuffleContext {
    /// Wrap an already registered context row
    ///
    /// Normally obtained from `ContextRegistry`, which guarantees one
    /// instance per name.
    pub fn new(id: ContextId, name: impl Into<String>, store: Arc<dyn TrackStore>) -> Self {
        Self {
            id,
            name: name.into(),
            store,
            writes: Mutex::new(()),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record that this context just chose `track`
    ///
    /// `None` is accepted so callers can forward a selection result
    /// unconditionally; it writes nothing.
    pub async fn record(&self, track: Option<&Track>) -> Result<()> {
        match track {
            Some(track) => self.record_at(track.id, Utc::now()).await,
            None => {
                tracing::debug!(context = %self.name, "no track chosen, nothing to record");
                Ok(())
            }
        }
    }

    /// Upsert the history entry for `track_id` with an explicit timestamp
    pub async fn record_at(&self, track_id: TrackId, at: DateTime<Utc>) -> Result<()> {
        let sql = format!(
            "INSERT INTO {HISTORY_TABLE} (shuffler_id, track_id, last_shuffled_at) VALUES (?, ?, ?) \
             ON CONFLICT(shuffler_id, track_id) DO UPDATE SET last_shuffled_at = excluded.last_shuffled_at"
        );

        let _guard = self.writes.lock().await;
        self.store
            .execute(
                &sql,
                &[SqlValue::from(self.id), SqlValue::from(track_id), SqlValue::from(at)],
            )
            .await?;

        tracing::debug!(context = %self.name, track_id, at = %at, "recorded shuffle");
        Ok(())
    }

    /// When this context last chose `track_id`
    pub async fn last_shuffled_at(&self, track_id: TrackId) -> Result<Option<DateTime<Utc>>> {
        let sql = format!(
            "SELECT last_shuffled_at FROM {HISTORY_TABLE} WHERE shuffler_id = ? AND track_id = ?"
        );
        let row = self
            .store
            .fetch_row(&sql, &[SqlValue::from(self.id), SqlValue::from(track_id)])
            .await?;

        Ok(row
            .and_then(|row| row.into_iter().next())
            .and_then(|value| value.as_timestamp()))
    }

    /// Number of tracks this context has ever chosen
    pub async fn history_len(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {HISTORY_TABLE} WHERE shuffler_id = ?");
        let count = self.store.fetch_i64(&sql, &[SqlValue::from(self.id)]).await?;
        Ok(count.unwrap_or(0))
    }

    /// Most recent choices, newest first
    pub async fn recent(&self, limit: u32) -> Result<Vec<(TrackId, DateTime<Utc>)>> {
        let sql = format!(
            "SELECT track_id, last_shuffled_at FROM {HISTORY_TABLE} \
             WHERE shuffler_id = ? ORDER BY last_shuffled_at DESC, track_id LIMIT ?"
        );
        let rows = self
            .store
            .fetch_rows(&sql, &[SqlValue::from(self.id), SqlValue::from(i64::from(limit))])
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let entry = row
                    .first()
                    .and_then(SqlValue::as_i64)
                    .zip(row.get(1).and_then(SqlValue::as_timestamp));
                if entry.is_none() {
                    tracing::warn!(context = %self.name, ?row, "skipping unreadable history row");
                }
                entry
            })
            .collect())
    }

    /// Record a manual insertion or discard of `track_id`
    pub async fn record_modification(&self, track_id: TrackId, kind: ModificationKind) -> Result<()> {
        let sql = format!(
            "INSERT INTO {MODIFICATION_TABLE} (shuffler_id, track_id, last_modified_at, modification_type) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(shuffler_id, track_id) DO UPDATE SET \
             last_modified_at = excluded.last_modified_at, \
             modification_type = excluded.modification_type"
        );

        let _guard = self.writes.lock().await;
        self.store
            .execute(
                &sql,
                &[
                    SqlValue::from(self.id),
                    SqlValue::from(track_id),
                    SqlValue::from(Utc::now()),
                    SqlValue::from(kind.code()),
                ],
            )
            .await?;

        tracing::debug!(context = %self.name, track_id, ?kind, "recorded modification");
        Ok(())
    }

    /// The last manual modification of `track_id`, if any
    pub async fn last_modification(
        &self,
        track_id: TrackId,
    ) -> Result<Option<(ModificationKind, DateTime<Utc>)>> {
        let sql = format!(
            "SELECT modification_type, last_modified_at FROM {MODIFICATION_TABLE} \
             WHERE shuffler_id = ? AND track_id = ?"
        );
        let row = self
            .store
            .fetch_row(&sql, &[SqlValue::from(self.id), SqlValue::from(track_id)])
            .await?;

        Ok(row.and_then(|row| {
            let kind = ModificationKind::from_code(row.first()?.as_i64()?)?;
            let at = row.get(1)?.as_timestamp()?;
            Some((kind, at))
        }))
    }
}
