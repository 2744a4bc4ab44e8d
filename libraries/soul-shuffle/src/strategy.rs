//! Selection strategies
//!
//! A strategy ("random by" something) decides which track comes next. The
//! concrete algorithm lives behind the [`RandomBy`] capability interface;
//! [`SelectionStrategy`] owns everything strategies share: the write-once
//! context binding, the rebindable view, the cached candidate queries, and
//! the routing between playback and shuffler (auto-DJ) selection.
//!
//! # Concurrency
//!
//! All mutable state sits behind one async mutex per strategy instance, so a
//! `bind_view` racing an in-flight `get_track` waits for it to finish and
//! never observes a half-rebuilt query cache.

use crate::context::ShuffleContext;
use crate::error::{Result, ShuffleError};
use crate::query::{record_query, CandidateQueryBuilder, QueryScope, QueryTag, StrategyFragments};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use soul_core::{ContextId, SqlValue, Track, TrackCache, TrackStore, TrackView};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Presentation metadata; carried through, never interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDescriptor {
    pub id: String,
    pub label: String,
    pub adverb: String,
    pub description: String,
    pub icon_name: String,
}

/// The capability interface every concrete strategy implements
///
/// Strategies implement at least `playback_track` and `shuffler_track`.
/// Both should go through the [`Selector`] so that the anti-repeat rules
/// (stream errors, recent plays/skips, this context's own history) apply.
#[async_trait]
pub trait RandomBy: Send + Sync {
    fn descriptor(&self) -> &StrategyDescriptor;

    /// Query fragments; read right after every view rebind
    fn fragments(&self) -> &StrategyFragments;

    /// Whether the strategy can currently produce anything at all
    fn is_ready(&self) -> bool {
        true
    }

    /// Forget derived state; called before `on_view_rebound`
    fn reset(&mut self) {}

    /// Recompute derived state (weights, pools) for a newly bound view
    async fn on_view_rebound(&mut self, _store: &dyn TrackStore, _view: &dyn TrackView) -> Result<()> {
        Ok(())
    }

    /// Whether a next track is believed obtainable at or after `after`
    ///
    /// Exhaustible strategies override this. A negative answer is not final:
    /// callers may probe again with a different cutoff.
    async fn has_next(&mut self, _selector: &mut Selector<'_>, _after: DateTime<Utc>) -> Result<bool> {
        Ok(true)
    }

    /// Next track for the playback queue, respecting the bound view's filter
    async fn playback_track(
        &mut self,
        selector: &mut Selector<'_>,
        after: DateTime<Utc>,
    ) -> Result<Option<Track>>;

    /// Next track for an auto-DJ context, drawn from the whole collection
    async fn shuffler_track(
        &mut self,
        selector: &mut Selector<'_>,
        after: DateTime<Utc>,
    ) -> Result<Option<Track>>;
}

/// Two-state context lifecycle; `Unbound -> Bound` is the only transition
#[derive(Debug, Clone, Default)]
pub enum ContextBinding {
    #[default]
    Unbound,
    Bound(Arc<ShuffleContext>),
}

impl ContextBinding {
    pub fn context(&self) -> Option<&Arc<ShuffleContext>> {
        match self {
            ContextBinding::Unbound => None,
            ContextBinding::Bound(context) => Some(context),
        }
    }
}

/// Everything derived from the current `bind_view` call
struct BoundView {
    view: Arc<dyn TrackView>,
    cache: Arc<dyn TrackCache>,
    fragments: StrategyFragments,
    tag: QueryTag,
}

struct StrategyState<S> {
    random_by: S,
    context: ContextBinding,
    view: Option<BoundView>,
    generation: u64,
    builder: CandidateQueryBuilder,
}

/// Shared machinery handed to a strategy for one selection
///
/// Borrowed from the strategy's locked state; it cannot outlive the call.
pub struct Selector<'a> {
    store: &'a dyn TrackStore,
    view: &'a BoundView,
    context: &'a ShuffleContext,
    builder: &'a mut CandidateQueryBuilder,
}

impl Selector<'_> {
    pub fn store(&self) -> &dyn TrackStore {
        self.store
    }

    pub fn view(&self) -> &dyn TrackView {
        self.view.view.as_ref()
    }

    pub fn context_id(&self) -> ContextId {
        self.context.id()
    }

    /// First candidate within the bound view, loaded through the view's cache
    ///
    /// A candidate that vanished between query and load counts as no
    /// candidate; a load failure is reported as `ShuffleError::Materialize`.
    pub async fn playback_candidate(&mut self, after: DateTime<Utc>) -> Result<Option<Track>> {
        let query = self.builder.get_or_compose(
            &self.view.tag,
            QueryScope::View,
            self.store.fragments(),
            self.view.view.as_ref(),
            &self.view.fragments,
        );
        let params = query.params(self.context.id(), after);

        let Some(track_id) = self.store.fetch_i64(query.sql(), &params).await? else {
            return Ok(None);
        };

        self.view
            .cache
            .materialize(track_id)
            .await
            .map_err(|source| ShuffleError::Materialize { track_id, source })
    }

    /// First candidate in the whole collection, loaded as a full record
    ///
    /// Same failure contract as `playback_candidate`: a record that cannot
    /// be loaded is reported as `ShuffleError::Materialize`.
    pub async fn shuffler_candidate(&mut self, after: DateTime<Utc>) -> Result<Option<Track>> {
        let query = self.builder.get_or_compose(
            &self.view.tag,
            QueryScope::Collection,
            self.store.fragments(),
            self.view.view.as_ref(),
            &self.view.fragments,
        );
        let params = query.params(self.context.id(), after);

        let Some(track_id) = self.store.fetch_i64(query.sql(), &params).await? else {
            return Ok(None);
        };

        let sql = record_query(self.store.fragments());
        self.store
            .fetch_track(&sql, &[SqlValue::from(track_id)])
            .await
            .map_err(|source| ShuffleError::Materialize { track_id, source })
    }
}

/// A strategy bound to one shuffle context and one (rebindable) view
pub struct SelectionStrategy<S> {
    descriptor: StrategyDescriptor,
    store: Arc<dyn TrackStore>,
    playback: Arc<ShuffleContext>,
    state: Mutex<StrategyState<S>>,
}

impl<S: RandomBy> SelectionStrategy<S> {
    /// `playback` is the distinguished Playback context; binding a strategy
    /// to that exact instance selects playback mode
    pub fn new(random_by: S, store: Arc<dyn TrackStore>, playback: Arc<ShuffleContext>) -> Self {
        Self {
            descriptor: random_by.descriptor().clone(),
            store,
            playback,
            state: Mutex::new(StrategyState {
                random_by,
                context: ContextBinding::Unbound,
                view: None,
                generation: 0,
                builder: CandidateQueryBuilder::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Bind the shuffle context; allowed exactly once
    pub async fn bind_context(&self, context: Arc<ShuffleContext>) -> Result<()> {
        let mut state = self.state.lock().await;

        if let ContextBinding::Bound(existing) = &state.context {
            return Err(ShuffleError::AlreadyBound {
                strategy: self.descriptor.id.clone(),
                context: existing.name().to_string(),
            });
        }

        tracing::debug!(strategy = %self.descriptor.id, context = %context.name(), "bound shuffle context");
        state.context = ContextBinding::Bound(context);
        Ok(())
    }

    /// Bind (or rebind) the filtered view and its cache
    ///
    /// Cached queries are always discarded. When the view's key differs from
    /// the current one the strategy is also reset and told to recompute its
    /// derived state. If that fails the strategy is left without a view.
    pub async fn bind_view(&self, view: Arc<dyn TrackView>, cache: Arc<dyn TrackCache>) -> Result<()> {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let changed = state
            .view
            .as_ref()
            .map_or(true, |bound| bound.view.key() != view.key());

        state.builder.invalidate();
        state.generation += 1;

        if changed {
            state.view = None;
            state.random_by.reset();
            state
                .random_by
                .on_view_rebound(self.store.as_ref(), view.as_ref())
                .await?;
        }

        tracing::debug!(
            strategy = %self.descriptor.id,
            view = %view.key(),
            generation = state.generation,
            changed,
            "bound track view"
        );

        state.view = Some(BoundView {
            tag: QueryTag {
                view_key: view.key().to_string(),
                generation: state.generation,
            },
            fragments: state.random_by.fragments().clone(),
            view,
            cache,
        });
        Ok(())
    }

    /// Whether a next track is believed obtainable at or after `after`
    pub async fn probe_has_next(&self, after: DateTime<Utc>) -> Result<bool> {
        let mut state = self.state.lock().await;
        let StrategyState {
            random_by,
            context,
            view,
            builder,
            ..
        } = &mut *state;

        let context = self.bound_context(context)?;
        let view = view
            .as_ref()
            .ok_or_else(|| ShuffleError::ViewNotBound(self.descriptor.id.clone()))?;

        let mut selector = Selector {
            store: self.store.as_ref(),
            view,
            context: context.as_ref(),
            builder,
        };
        random_by.has_next(&mut selector, after).await
    }

    /// Select the next track
    ///
    /// On the Playback context this never writes history. On any other
    /// context exactly one history write is attempted per call, after the
    /// shuffler selection, whatever it returned.
    pub async fn get_track(&self, after: DateTime<Utc>) -> Result<Option<Track>> {
        let mut state = self.state.lock().await;
        let StrategyState {
            random_by,
            context,
            view,
            builder,
            ..
        } = &mut *state;

        let context = Arc::clone(self.bound_context(context)?);
        let view = view
            .as_ref()
            .ok_or_else(|| ShuffleError::ViewNotBound(self.descriptor.id.clone()))?;

        let mut selector = Selector {
            store: self.store.as_ref(),
            view,
            context: context.as_ref(),
            builder,
        };

        if Arc::ptr_eq(&context, &self.playback) {
            return random_by.playback_track(&mut selector, after).await;
        }

        let track = random_by.shuffler_track(&mut selector, after).await?;
        context.record(track.as_ref()).await?;
        Ok(track)
    }

    /// The bound context, if any
    pub async fn context(&self) -> Option<Arc<ShuffleContext>> {
        self.state.lock().await.context.context().cloned()
    }

    /// Key of the bound view, if any
    pub async fn view_key(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .view
            .as_ref()
            .map(|bound| bound.tag.view_key.clone())
    }

    pub async fn is_ready(&self) -> bool {
        self.state.lock().await.random_by.is_ready()
    }

    /// How many times candidate query text has been composed
    pub async fn compositions(&self) -> u64 {
        self.state.lock().await.builder.compositions()
    }

    fn bound_context<'c>(&self, binding: &'c ContextBinding) -> Result<&'c Arc<ShuffleContext>> {
        binding
            .context()
            .ok_or_else(|| ShuffleError::ContextNotBound(self.descriptor.id.clone()))
    }
}
