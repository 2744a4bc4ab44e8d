//! Candidate query composition
//!
//! A candidate query is assembled from four fragment sources: the store
//! provider's base fragments, the bound view, the strategy, and the
//! anti-repeat join against the shuffle history. The structural text is
//! composed once per binding and cached; only the context id and the
//! `after` cutoffs are supplied on each evaluation.

use crate::history::{HISTORY_TABLE, LAST_SHUFFLED_AT};
use chrono::{DateTime, Utc};
use soul_core::{ContextId, ProviderFragments, SqlValue, TrackView};
use std::sync::Arc;

/// Excludes tracks that failed to stream or were played/skipped recently
///
/// Takes two `after` parameters.
pub const RANDOM_CONDITION: &str = "last_stream_error = 0 \
     AND (last_played_at < ? OR last_played_at IS NULL) \
     AND (last_skipped_at < ? OR last_skipped_at IS NULL)";

/// Strategy-owned query fragments
///
/// `select` and `condition` are optional; `from` holds extra joins. The
/// ordering is what makes a strategy "random by" something.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyFragments {
    pub select: Option<String>,
    pub from: Option<String>,
    pub condition: Option<String>,
    pub order_by: String,
}

impl StrategyFragments {
    pub fn ordered_by(order_by: impl Into<String>) -> Self {
        Self {
            order_by: order_by.into(),
            ..Self::default()
        }
    }
}

/// What part of the store a candidate query ranges over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// Base fragments plus the bound view's source and filter
    View,
    /// Base fragments only; the view's filter is ignored
    Collection,
}

/// Identity of the bindings a cached query was composed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTag {
    pub view_key: String,
    pub generation: u64,
}

/// A composed, parameterized candidate query yielding at most one row
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    sql: Arc<str>,
    scope: QueryScope,
    tag: QueryTag,
}

impl CandidateQuery {
    /// Positional parameters: context id, then three `after` cutoffs
    pub const PARAM_COUNT: usize = 4;

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn scope(&self) -> QueryScope {
        self.scope
    }

    pub fn tag(&self) -> &QueryTag {
        &self.tag
    }

    /// Parameters for one evaluation
    pub fn params(&self, context_id: ContextId, after: DateTime<Utc>) -> Vec<SqlValue> {
        vec![
            SqlValue::from(context_id),
            SqlValue::from(after),
            SqlValue::from(after),
            SqlValue::from(after),
        ]
    }
}

fn non_empty(fragment: Option<&str>) -> Option<&str> {
    fragment.filter(|f| !f.trim().is_empty())
}

/// Compose the candidate query text
///
/// Pure function of its inputs. With `QueryScope::Collection` the view is
/// not consulted at all.
pub fn compose(
    provider: &ProviderFragments,
    view: &dyn TrackView,
    strategy: &StrategyFragments,
    scope: QueryScope,
) -> String {
    let mut projection = provider.select.clone();
    if let Some(select) = non_empty(strategy.select.as_deref()) {
        projection.push_str(", ");
        projection.push_str(select);
    }

    let (view_from, view_condition) = match scope {
        QueryScope::View => (
            view.from_fragment(),
            non_empty(view.condition_fragment()).unwrap_or("1=1"),
        ),
        QueryScope::Collection => ("", "1=1"),
    };

    let mut source = provider.from.clone();
    for fragment in [Some(view_from), strategy.from.as_deref()] {
        if let Some(fragment) = non_empty(fragment) {
            source.push(' ');
            source.push_str(fragment);
        }
    }

    let strategy_condition = non_empty(strategy.condition.as_deref()).unwrap_or("1=1");
    let order_by = if strategy.order_by.trim().is_empty() {
        provider.track_id_column.as_str()
    } else {
        strategy.order_by.as_str()
    };

    format!(
        "SELECT {projection} \
         FROM {source} \
         LEFT OUTER JOIN {HISTORY_TABLE} ON ({HISTORY_TABLE}.shuffler_id = ? \
         AND {HISTORY_TABLE}.track_id = {track_id}) \
         WHERE ({base}) AND ({view_condition}) AND ({strategy_condition}) \
         AND {RANDOM_CONDITION} \
         AND ({HISTORY_TABLE}.{LAST_SHUFFLED_AT} < ? OR {HISTORY_TABLE}.{LAST_SHUFFLED_AT} IS NULL) \
         ORDER BY {order_by} LIMIT 1",
        track_id = provider.track_id_column,
        base = provider.condition_or_true(),
    )
}

/// Load one full record by id from the provider's base projection
pub fn record_query(provider: &ProviderFragments) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?",
        provider.select, provider.from, provider.track_id_column
    )
}

/// Caches composed queries per scope, keyed by the bindings' tag
#[derive(Debug, Default)]
pub struct CandidateQueryBuilder {
    view_query: Option<CandidateQuery>,
    collection_query: Option<CandidateQuery>,
    compositions: u64,
}

impl CandidateQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached query for `scope`, composing it if absent or stale
    pub fn get_or_compose(
        &mut self,
        tag: &QueryTag,
        scope: QueryScope,
        provider: &ProviderFragments,
        view: &dyn TrackView,
        strategy: &StrategyFragments,
    ) -> &CandidateQuery {
        let slot = match scope {
            QueryScope::View => &mut self.view_query,
            QueryScope::Collection => &mut self.collection_query,
        };

        if slot.as_ref().is_some_and(|query| &query.tag != tag) {
            *slot = None;
        }

        let compositions = &mut self.compositions;
        slot.get_or_insert_with(|| {
            let sql = compose(provider, view, strategy, scope);
            tracing::trace!(?scope, view = %tag.view_key, generation = tag.generation, %sql, "composed candidate query");
            *compositions += 1;
            CandidateQuery {
                sql: Arc::from(sql),
                scope,
                tag: tag.clone(),
            }
        })
    }

    /// The tag a cached query was composed under, if one is cached
    pub fn cached_tag(&self, scope: QueryScope) -> Option<&QueryTag> {
        match scope {
            QueryScope::View => self.view_query.as_ref(),
            QueryScope::Collection => self.collection_query.as_ref(),
        }
        .map(CandidateQuery::tag)
    }

    /// Drop every cached query
    pub fn invalidate(&mut self) {
        self.view_query = None;
        self.collection_query = None;
    }

    /// How many times query text has been composed
    pub fn compositions(&self) -> u64 {
        self.compositions
    }
}
