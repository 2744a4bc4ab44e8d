//! Shuffle context registry
//!
//! Hands out exactly one `ShuffleContext` per stable name, and exactly one
//! distinguished Playback context. Strategies created through the registry
//! are wired with that Playback handle so mode routing is an identity check.

use crate::context::ShuffleContext;
use crate::error::{Result, ShuffleError};
use crate::history::{self, CONTEXT_TABLE, HISTORY_TABLE};
use crate::strategy::{RandomBy, SelectionStrategy};
use soul_core::{ContextId, SqlValue, TrackStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Stable name of the interactive playback context
pub const PLAYBACK_CONTEXT_NAME: &str = "playback";

/// A registered context and the size of its history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSummary {
    pub id: ContextId,
    pub name: String,
    pub history_entries: i64,
}

pub struct ContextRegistry {
    store: Arc<dyn TrackStore>,
    playback: Arc<ShuffleContext>,
    contexts: Mutex<HashMap<String, Arc<ShuffleContext>>>,
}

impl ContextRegistry {
    /// Install the history schema and register the Playback context
    pub async fn open(store: Arc<dyn TrackStore>) -> Result<Self> {
        history::install(store.as_ref()).await?;

        let playback_id = register(store.as_ref(), PLAYBACK_CONTEXT_NAME).await?;
        let playback = Arc::new(ShuffleContext::new(
            playback_id,
            PLAYBACK_CONTEXT_NAME,
            Arc::clone(&store),
        ));

        let mut contexts = HashMap::new();
        contexts.insert(PLAYBACK_CONTEXT_NAME.to_string(), Arc::clone(&playback));

        Ok(Self {
            store,
            playback,
            contexts: Mutex::new(contexts),
        })
    }

    /// The distinguished Playback context
    pub fn playback(&self) -> &Arc<ShuffleContext> {
        &self.playback
    }

    pub fn store(&self) -> &Arc<dyn TrackStore> {
        &self.store
    }

    /// Get or create the context registered under `name`
    ///
    /// Repeated calls with the same name return the same instance.
    pub async fn context(&self, name: &str) -> Result<Arc<ShuffleContext>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShuffleError::InvalidContextName(name.to_string()));
        }

        let mut contexts = self.contexts.lock().await;
        if let Some(context) = contexts.get(name) {
            return Ok(Arc::clone(context));
        }

        let id = register(self.store.as_ref(), name).await?;
        let context = Arc::new(ShuffleContext::new(id, name, Arc::clone(&self.store)));
        contexts.insert(name.to_string(), Arc::clone(&context));
        tracing::info!(context = name, id, "registered shuffle context");

        Ok(context)
    }

    /// Every registered context, including ones created by earlier runs
    pub async fn list(&self) -> Result<Vec<ContextSummary>> {
        let sql = format!(
            "SELECT c.id, c.name, COUNT(h.track_id) \
             FROM {CONTEXT_TABLE} c \
             LEFT JOIN {HISTORY_TABLE} h ON h.shuffler_id = c.id \
             GROUP BY c.id, c.name ORDER BY c.id"
        );
        let rows = self.store.fetch_rows(&sql, &[]).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let summary = summary_from_row(&row);
                if summary.is_none() {
                    tracing::warn!(?row, "skipping unreadable shuffle context row");
                }
                summary
            })
            .collect())
    }

    /// Wrap `random_by` in a `SelectionStrategy` that knows this registry's
    /// Playback context
    pub fn strategy<S: RandomBy>(&self, random_by: S) -> SelectionStrategy<S> {
        SelectionStrategy::new(random_by, Arc::clone(&self.store), Arc::clone(&self.playback))
    }
}

fn summary_from_row(row: &[SqlValue]) -> Option<ContextSummary> {
    Some(ContextSummary {
        id: row.first()?.as_i64()?,
        name: row.get(1)?.as_str()?.to_string(),
        history_entries: row.get(2)?.as_i64()?,
    })
}

async fn register(store: &dyn TrackStore, name: &str) -> Result<ContextId> {
    let insert = format!("INSERT INTO {CONTEXT_TABLE} (name) VALUES (?) ON CONFLICT(name) DO NOTHING");
    store.execute(&insert, &[SqlValue::from(name)]).await?;

    let select = format!("SELECT id FROM {CONTEXT_TABLE} WHERE name = ?");
    let id = store.fetch_i64(&select, &[SqlValue::from(name)]).await?;

    id.ok_or_else(|| {
        ShuffleError::Storage(soul_core::SoulError::not_found("Shuffle context", name))
    })
}
