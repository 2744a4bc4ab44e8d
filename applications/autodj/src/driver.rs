//! Auto-DJ pick loop
//!
//! Drives one `SelectionStrategy` bound to a named auto-DJ context. Each
//! round probes for a next track with the configured lookback, retries the
//! probe once with the current time, then selects. Manual edits (discard,
//! insert) go to the same context's history.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use soul_core::{Track, TrackCache, TrackId, TrackView};
use soul_shuffle::{ContextRegistry, ModificationKind, RandomBy, SelectionStrategy, ShuffleContext};
use std::sync::Arc;

/// Outcome of one selection round
#[derive(Debug, Clone, PartialEq)]
pub enum Round {
    Picked(Track),
    /// The candidate could not be loaded; the next round may do better
    Skipped,
    /// Nothing is eligible, even with the shortest lookback
    Exhausted,
}

/// Summary of a `run`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickReport {
    pub picked: Vec<Track>,
    pub skipped: usize,
    pub exhausted: bool,
}

pub struct AutoDj<S> {
    strategy: SelectionStrategy<S>,
    context: Arc<ShuffleContext>,
    lookback: Duration,
}

impl<S: RandomBy> AutoDj<S> {
    /// Bind `random_by` to the context named `context` and to `view`
    pub async fn start(
        registry: &ContextRegistry,
        random_by: S,
        context: &str,
        view: Arc<dyn TrackView>,
        cache: Arc<dyn TrackCache>,
        lookback: Duration,
    ) -> Result<Self> {
        let strategy = registry.strategy(random_by);
        let context = registry.context(context).await?;
        strategy.bind_context(Arc::clone(&context)).await?;
        strategy.bind_view(view, cache).await?;

        tracing::info!(
            strategy = strategy.id(),
            context = context.name(),
            lookback_minutes = lookback.num_minutes(),
            "auto-DJ started"
        );

        Ok(Self {
            strategy,
            context,
            lookback,
        })
    }

    pub fn strategy(&self) -> &SelectionStrategy<S> {
        &self.strategy
    }

    pub fn context(&self) -> &Arc<ShuffleContext> {
        &self.context
    }

    /// The user removed `track_id` from this context's upcoming tracks
    ///
    /// The track also counts as shuffled now, so it stays out of the
    /// lookback window like a regular pick.
    pub async fn discard(&self, track_id: TrackId) -> Result<()> {
        self.modify(track_id, ModificationKind::Discard).await
    }

    /// The user queued `track_id` by hand on this context
    pub async fn insert(&self, track_id: TrackId) -> Result<()> {
        self.modify(track_id, ModificationKind::Insertion).await
    }

    async fn modify(&self, track_id: TrackId, kind: ModificationKind) -> Result<()> {
        self.context.record_modification(track_id, kind).await?;
        self.context.record_at(track_id, Utc::now()).await?;

        tracing::info!(track_id, ?kind, context = self.context.name(), "recorded manual modification");
        Ok(())
    }

    /// Run one selection round at `now`
    pub async fn round(&self, now: DateTime<Utc>) -> Result<Round> {
        let mut after = now - self.lookback;

        if !self.strategy.probe_has_next(after).await? {
            tracing::debug!(%after, "nothing left within lookback, retrying with now");
            if !self.strategy.probe_has_next(now).await? {
                return Ok(Round::Exhausted);
            }
            after = now;
        }

        match self.strategy.get_track(after).await {
            Ok(Some(track)) => {
                tracing::info!(track_id = track.id, title = %track.title, "picked track");
                Ok(Round::Picked(track))
            }
            Ok(None) => Ok(Round::Exhausted),
            Err(err) if err.is_per_track() => {
                tracing::warn!(error = %err, "skipping track that failed to load");
                Ok(Round::Skipped)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Run up to `count` rounds, stopping early when nothing is left
    pub async fn run(&self, count: usize) -> Result<PickReport> {
        let mut report = PickReport::default();

        for _ in 0..count {
            match self.round(Utc::now()).await? {
                Round::Picked(track) => report.picked.push(track),
                Round::Skipped => report.skipped += 1,
                Round::Exhausted => {
                    tracing::info!(picked = report.picked.len(), "no eligible tracks left");
                    report.exhausted = true;
                    break;
                }
            }
        }

        Ok(report)
    }
}
