//! Property-based tests for candidate query composition

use proptest::prelude::*;
use soul_core::{ProviderFragments, TrackView};
use soul_shuffle::{compose, CandidateQuery, QueryScope, StrategyFragments};

struct ArbitraryView {
    from: String,
    condition: Option<String>,
}

impl TrackView for ArbitraryView {
    fn key(&self) -> &str {
        "arbitrary"
    }

    fn from_fragment(&self) -> &str {
        &self.from
    }

    fn condition_fragment(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

fn provider() -> ProviderFragments {
    ProviderFragments {
        select: "t.id".to_string(),
        from: "tracks t".to_string(),
        condition: None,
        track_id_column: "t.id".to_string(),
    }
}

// Fragments never contain placeholders of their own
fn fragment() -> impl Strategy<Value = String> {
    "[a-z_. =<>0-9]{0,24}"
}

fn any_scope() -> impl Strategy<Value = QueryScope> {
    prop_oneof![Just(QueryScope::View), Just(QueryScope::Collection)]
}

proptest! {
    #[test]
    fn composed_query_has_fixed_parameter_count(
        view_from in fragment(),
        view_condition in proptest::option::of(fragment()),
        select in proptest::option::of(fragment()),
        condition in proptest::option::of(fragment()),
        order_by in fragment(),
        scope in any_scope(),
    ) {
        let view = ArbitraryView { from: view_from, condition: view_condition };
        let strategy = StrategyFragments { select, from: None, condition, order_by };

        let sql = compose(&provider(), &view, &strategy, scope);

        prop_assert_eq!(sql.matches('?').count(), CandidateQuery::PARAM_COUNT);
        prop_assert!(sql.ends_with(" LIMIT 1"));
        prop_assert!(sql.starts_with("SELECT t.id"));
    }

    #[test]
    fn collection_scope_never_mentions_view(
        marker in "[a-z]{6,12}",
        order_by in fragment(),
    ) {
        let view = ArbitraryView {
            from: format!("INNER JOIN view_{marker} v ON v.track_id = t.id"),
            condition: Some(format!("v.{marker} = 1")),
        };
        let strategy = StrategyFragments::ordered_by(order_by);

        let collection = compose(&provider(), &view, &strategy, QueryScope::Collection);
        let filtered = compose(&provider(), &view, &strategy, QueryScope::View);

        let view_table = format!("view_{}", marker);
        prop_assert!(!collection.contains(&view_table));
        prop_assert!(filtered.contains(&view_table));
    }

    #[test]
    fn composition_is_deterministic(order_by in fragment(), scope in any_scope()) {
        let view = ArbitraryView { from: String::new(), condition: None };
        let strategy = StrategyFragments::ordered_by(order_by);

        prop_assert_eq!(
            compose(&provider(), &view, &strategy, scope),
            compose(&provider(), &view, &strategy, scope)
        );
    }
}
